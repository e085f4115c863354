use serde::{Deserialize, Serialize};

use crate::volume::ImageGeometry;

/// Outcome of the image header check. Each category has its own bit; a
/// zero mask means the candidate conforms to the reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryMismatch {
    pub size: bool,
    pub spacing: bool,
    pub origin: bool,
    pub orientation: bool,
}

impl GeometryMismatch {
    pub const SIZE: u8 = 0x1;
    pub const SPACING: u8 = 0x2;
    pub const ORIGIN: u8 = 0x4;
    pub const ORIENTATION: u8 = 0x8;

    pub fn bits(&self) -> u8 {
        let mut mask = 0;
        if self.size {
            mask |= Self::SIZE;
        }
        if self.spacing {
            mask |= Self::SPACING;
        }
        if self.origin {
            mask |= Self::ORIGIN;
        }
        if self.orientation {
            mask |= Self::ORIENTATION;
        }
        mask
    }

    pub fn any(&self) -> bool {
        self.bits() != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTolerances {
    pub spacing: f64,
    pub origin: f64,
    pub direction: f64,
}

pub fn check_geometry(
    candidate: &ImageGeometry,
    reference: &ImageGeometry,
    tolerances: &ImageTolerances,
) -> GeometryMismatch {
    GeometryMismatch {
        size: candidate.size != reference.size,
        spacing: !within(&candidate.spacing, &reference.spacing, tolerances.spacing),
        origin: !within(&candidate.origin, &reference.origin, tolerances.origin),
        orientation: !candidate
            .directions
            .iter()
            .zip(reference.directions.iter())
            .all(|(a, b)| within(a, b, tolerances.direction)),
    }
}

fn within(a: &[f64; 3], b: &[f64; 3], tolerance: f64) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tolerance)
}
