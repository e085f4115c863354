use std::collections::BTreeMap;

use ndarray::{Array4, Axis};
use serde::{Deserialize, Serialize};

use crate::error::QcError;

pub const B_VALUE_KEY: &str = "DWMRI_b-value";
pub const GRADIENT_KEY_PREFIX: &str = "DWMRI_gradient_";

pub fn gradient_key(index: usize) -> String {
    format!("{GRADIENT_KEY_PREFIX}{index:04}")
}

/// Spatial header of one 3-D gradient volume. `size` and `spacing` are in
/// (x, y, z) order; `directions` holds the axis direction cosines row-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    pub size: [usize; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
    pub directions: [[f64; 3]; 3],
}

impl ImageGeometry {
    pub fn identity(size: [usize; 3], spacing: [f64; 3]) -> Self {
        Self {
            size,
            spacing,
            origin: [0.0; 3],
            directions: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwiHeader {
    pub geometry: ImageGeometry,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub measurement_frame: Option<[[f64; 3]; 3]>,
}

impl DwiHeader {
    pub fn new(geometry: ImageGeometry, b_value: f64, gradients: &[[f64; 3]]) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(B_VALUE_KEY.to_string(), format!("{b_value}"));
        for (i, g) in gradients.iter().enumerate() {
            metadata.insert(gradient_key(i), format!("{} {} {}", g[0], g[1], g[2]));
        }
        Self {
            geometry,
            metadata,
            measurement_frame: None,
        }
    }
}

/// A loaded 4-D DWI volume. Voxels are laid out as (volume, z, y, x).
/// `source_index` maps every volume back to its position in the acquisition
/// the session started from, so subsets stay traceable.
#[derive(Debug, Clone)]
pub struct DwiVolume {
    pub header: DwiHeader,
    pub voxels: Array4<u16>,
    pub source_index: Vec<usize>,
}

impl DwiVolume {
    pub fn new(header: DwiHeader, voxels: Array4<u16>) -> Result<Self, QcError> {
        let (volumes, z, y, x) = voxels.dim();
        if volumes == 0 {
            return Err(QcError::Load("volume has no gradient images".to_string()));
        }
        let size = header.geometry.size;
        if (x, y, z) != (size[0], size[1], size[2]) {
            return Err(QcError::Load(format!(
                "voxel array {}x{}x{} does not match header size {}x{}x{}",
                x, y, z, size[0], size[1], size[2]
            )));
        }
        Ok(Self {
            header,
            voxels,
            source_index: (0..volumes).collect(),
        })
    }

    /// Volume carrying header metadata only, for replaying recorded
    /// checker measurements.
    pub fn header_only(header: DwiHeader, volumes: usize) -> Result<Self, QcError> {
        if volumes == 0 {
            return Err(QcError::Load("volume has no gradient images".to_string()));
        }
        Ok(Self {
            header,
            voxels: Array4::zeros((volumes, 0, 0, 0)),
            source_index: (0..volumes).collect(),
        })
    }

    pub fn volumes(&self) -> usize {
        self.source_index.len()
    }

    pub fn has_voxels(&self) -> bool {
        !self.voxels.is_empty()
    }

    /// Keeps the volumes at `keep` (positions in this volume), renumbering
    /// the gradient metadata to match.
    pub fn select(&self, keep: &[usize]) -> Self {
        let mut metadata: BTreeMap<String, String> = self
            .header
            .metadata
            .iter()
            .filter(|(k, _)| !k.starts_with(GRADIENT_KEY_PREFIX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (new_pos, &old_pos) in keep.iter().enumerate() {
            if let Some(value) = self.header.metadata.get(&gradient_key(old_pos)) {
                metadata.insert(gradient_key(new_pos), value.clone());
            }
        }
        Self {
            header: DwiHeader {
                geometry: self.header.geometry.clone(),
                metadata,
                measurement_frame: self.header.measurement_frame,
            },
            voxels: self.voxels.select(Axis(0), keep),
            source_index: keep.iter().map(|&p| self.source_index[p]).collect(),
        }
    }
}
