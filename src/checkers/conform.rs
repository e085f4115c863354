use anyhow::Result;
use ndarray::{Array4, s};

use crate::checkers::Conformer;
use crate::volume::{DwiHeader, DwiVolume, ImageGeometry};

/// Crops or zero-pads every volume to the reference size and stamps the
/// reference geometry onto the header.
pub struct CropConformer;

impl Conformer for CropConformer {
    fn conform(&self, volume: &DwiVolume, reference: &ImageGeometry) -> Result<DwiVolume> {
        let header = DwiHeader {
            geometry: reference.clone(),
            ..volume.header.clone()
        };
        let voxels = if volume.has_voxels() {
            let (n, z, y, x) = volume.voxels.dim();
            let [rx, ry, rz] = reference.size;
            let (cz, cy, cx) = (z.min(rz), y.min(ry), x.min(rx));
            let mut out = Array4::<u16>::zeros((n, rz, ry, rx));
            out.slice_mut(s![.., ..cz, ..cy, ..cx])
                .assign(&volume.voxels.slice(s![.., ..cz, ..cy, ..cx]));
            out
        } else {
            volume.voxels.clone()
        };
        Ok(DwiVolume {
            header,
            voxels,
            source_index: volume.source_index.clone(),
        })
    }
}
