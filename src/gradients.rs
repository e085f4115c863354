use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::QcError;
use crate::volume::{B_VALUE_KEY, DwiHeader, DwiVolume, GRADIENT_KEY_PREFIX, gradient_key};

pub const BASELINE_GROUP: usize = 0;

const ZERO_NORM: f64 = 1e-6;
const SAME_DIRECTION_COS: f64 = 0.9999;
const B_VALUE_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientDirection {
    pub vector: [f64; 3],
    pub b_value: f64,
    /// Position of the volume in the source acquisition.
    pub index: usize,
    /// 0 for baselines, otherwise the distinct-direction group (1-based).
    pub group: usize,
}

impl GradientDirection {
    pub fn is_baseline(&self) -> bool {
        self.group == BASELINE_GROUP
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffusionCounts {
    pub baseline_number: usize,
    pub b_value_number: usize,
    pub gradient_dir_number: usize,
    /// Diffusion-weighted volumes, baselines excluded.
    pub gradient_number: usize,
    /// Volumes per direction group; entry 0 is the baseline group.
    pub repetitions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientSet {
    directions: Vec<GradientDirection>,
    groups: usize,
}

impl GradientSet {
    pub fn new(vectors: &[[f64; 3]], b_value: f64) -> Self {
        let indices: Vec<usize> = (0..vectors.len()).collect();
        Self::with_indices(vectors, b_value, &indices)
    }

    pub fn with_indices(vectors: &[[f64; 3]], b_value: f64, indices: &[usize]) -> Self {
        let mut representatives: Vec<[f64; 3]> = Vec::new();
        let mut directions = Vec::with_capacity(vectors.len());
        for (&vector, &index) in vectors.iter().zip(indices) {
            let norm = norm(&vector);
            let group = if norm < ZERO_NORM {
                BASELINE_GROUP
            } else {
                let unit = scale(&vector, 1.0 / norm);
                match representatives
                    .iter()
                    .position(|r| dot(r, &unit) >= SAME_DIRECTION_COS)
                {
                    Some(pos) => pos + 1,
                    None => {
                        representatives.push(unit);
                        representatives.len()
                    }
                }
            };
            directions.push(GradientDirection {
                vector,
                b_value: if group == BASELINE_GROUP {
                    0.0
                } else {
                    b_value * norm * norm
                },
                index,
                group,
            });
        }
        Self {
            directions,
            groups: representatives.len() + 1,
        }
    }

    /// Reads the NRRD-style diffusion keys. Directions are taken as stored;
    /// see [`GradientSet::with_measurement_frame`].
    pub fn from_header(
        header: &DwiHeader,
        source_index: &[usize],
    ) -> Result<(Self, f64), QcError> {
        let b_raw = header
            .metadata
            .get(B_VALUE_KEY)
            .ok_or_else(|| QcError::Metadata(format!("{B_VALUE_KEY} missing")))?;
        let b_value: f64 = b_raw
            .trim()
            .parse()
            .map_err(|_| QcError::Metadata(format!("{B_VALUE_KEY} is not a number: {b_raw}")))?;
        if !b_value.is_finite() || b_value < 0.0 {
            return Err(QcError::Metadata(format!(
                "{B_VALUE_KEY} out of range: {b_value}"
            )));
        }

        let declared = header
            .metadata
            .keys()
            .filter(|k| k.starts_with(GRADIENT_KEY_PREFIX))
            .count();
        if declared != source_index.len() {
            return Err(QcError::Metadata(format!(
                "{} gradient directions for {} volumes",
                declared,
                source_index.len()
            )));
        }

        let mut vectors = Vec::with_capacity(declared);
        for i in 0..declared {
            let key = gradient_key(i);
            let raw = header
                .metadata
                .get(&key)
                .ok_or_else(|| QcError::Metadata(format!("{key} missing")))?;
            vectors.push(parse_vector(&key, raw)?);
        }
        Ok((Self::with_indices(&vectors, b_value, source_index), b_value))
    }

    /// Rotates every direction into patient space. Rotation preserves the
    /// grouping, so groups are carried over unchanged.
    pub fn with_measurement_frame(&self, frame: &[[f64; 3]; 3]) -> Self {
        let directions = self
            .directions
            .iter()
            .map(|d| {
                let v = d.vector;
                let mut out = [0.0; 3];
                for (row, o) in frame.iter().zip(out.iter_mut()) {
                    *o = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
                }
                GradientDirection { vector: out, ..d.clone() }
            })
            .collect();
        Self {
            directions,
            groups: self.groups,
        }
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GradientDirection> {
        self.directions.iter()
    }

    pub fn directions(&self) -> &[GradientDirection] {
        &self.directions
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn baseline_positions(&self) -> Vec<usize> {
        self.directions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_baseline())
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn counts(&self) -> DiffusionCounts {
        self.counts_excluding(&BTreeSet::new())
    }

    /// Counts what remains after dropping the volumes whose source index is
    /// in `excluded`. Groups keep their slot even when emptied.
    pub fn counts_excluding(&self, excluded: &BTreeSet<usize>) -> DiffusionCounts {
        let mut repetitions = vec![0usize; self.groups];
        let mut b_values = Vec::new();
        for d in self.directions.iter().filter(|d| !excluded.contains(&d.index)) {
            repetitions[d.group] += 1;
            if !d.is_baseline() {
                b_values.push(d.b_value);
            }
        }
        DiffusionCounts {
            baseline_number: repetitions[BASELINE_GROUP],
            b_value_number: distinct_b_values(&mut b_values),
            gradient_dir_number: repetitions[1..].iter().filter(|&&n| n > 0).count(),
            gradient_number: repetitions[1..].iter().sum(),
            repetitions,
        }
    }
}

/// Extracts the gradient table of `volume` and applies its measurement
/// frame when the header declares a non-identity one.
pub fn load(volume: &DwiVolume) -> Result<(GradientSet, f64), QcError> {
    let (set, b_value) = GradientSet::from_header(&volume.header, &volume.source_index)?;
    match &volume.header.measurement_frame {
        Some(frame) if !is_identity(frame) => Ok((set.with_measurement_frame(frame), b_value)),
        _ => Ok((set, b_value)),
    }
}

fn parse_vector(key: &str, raw: &str) -> Result<[f64; 3], QcError> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(QcError::Metadata(format!(
            "{key} has {} components, expected 3",
            parts.len()
        )));
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        let v: f64 = part
            .parse()
            .map_err(|_| QcError::Metadata(format!("{key} component is not a number: {part}")))?;
        if !v.is_finite() {
            return Err(QcError::Metadata(format!("{key} component is not finite")));
        }
        *slot = v;
    }
    Ok(out)
}

fn distinct_b_values(values: &mut [f64]) -> usize {
    values.sort_by(|a, b| a.total_cmp(b));
    let mut count = 0;
    let mut last: Option<f64> = None;
    for &v in values.iter() {
        if last.is_none_or(|l| v - l > B_VALUE_TOLERANCE) {
            count += 1;
            last = Some(v);
        }
    }
    count
}

fn is_identity(frame: &[[f64; 3]; 3]) -> bool {
    frame.iter().enumerate().all(|(r, row)| {
        row.iter()
            .enumerate()
            .all(|(c, &v)| (v - if r == c { 1.0 } else { 0.0 }).abs() < 1e-9)
    })
}

pub(crate) fn norm(v: &[f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

pub(crate) fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn scale(v: &[f64; 3], s: f64) -> [f64; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}
