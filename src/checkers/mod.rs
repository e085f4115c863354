//! Collaborator contracts for the numeric filters the pipeline consumes.
//!
//! The pipeline only looks at what these return. Every checker receives the
//! current working volume and must answer with one entry per volume, in
//! volume order.

use anyhow::Result;

use crate::gradients::GradientSet;
use crate::protocol::EddyMotionMethod;
use crate::statistics::RegistrationMeasure;
use crate::volume::{DwiVolume, ImageGeometry};

pub mod average;
pub mod conform;

pub use average::MeanBaselineAverager;
pub use conform::CropConformer;

pub trait SliceChecker {
    /// Correlations between adjacent slices, one vector per volume.
    fn evaluate(&self, volume: &DwiVolume) -> Result<Vec<Vec<f64>>>;
}

pub trait InterlaceChecker {
    /// Correlation and motion between the odd and even interleaves.
    fn evaluate(&self, volume: &DwiVolume) -> Result<Vec<RegistrationMeasure>>;
}

pub trait GradientChecker {
    /// Correlation and motion of each volume registered to the baseline.
    fn evaluate(
        &self,
        volume: &DwiVolume,
        gradients: &GradientSet,
    ) -> Result<Vec<RegistrationMeasure>>;
}

pub trait Conformer {
    fn conform(&self, volume: &DwiVolume, reference: &ImageGeometry) -> Result<DwiVolume>;
}

pub trait BaselineAverager {
    /// Replaces all baselines with one averaged baseline placed at the
    /// position of the first.
    fn average(&self, volume: &DwiVolume, gradients: &GradientSet) -> Result<DwiVolume>;
}

pub trait EddyMotionCorrector {
    fn correct(
        &self,
        volume: &DwiVolume,
        gradients: &GradientSet,
        method: EddyMotionMethod,
    ) -> Result<DwiVolume>;
}

#[derive(Clone, Copy)]
pub struct Checkers<'a> {
    pub slice: &'a dyn SliceChecker,
    pub interlace: &'a dyn InterlaceChecker,
    pub gradient: &'a dyn GradientChecker,
    pub conformer: &'a dyn Conformer,
    pub baseline_averager: &'a dyn BaselineAverager,
    pub eddy_motion: &'a dyn EddyMotionCorrector,
}
