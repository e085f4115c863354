//! Replay of pre-computed checker outputs.
//!
//! A recorded session is a JSON document with the DWI header and the
//! measurements the slice, interlace and gradient filters produced for each
//! source volume. Replaying it drives the full pipeline without image I/O.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::checkers::{
    Checkers, CropConformer, EddyMotionCorrector, GradientChecker, InterlaceChecker,
    MeanBaselineAverager, SliceChecker,
};
use crate::error::QcError;
use crate::gradients::GradientSet;
use crate::protocol::EddyMotionMethod;
use crate::statistics::RegistrationMeasure;
use crate::volume::{DwiHeader, DwiVolume};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSession {
    pub header: DwiHeader,
    pub volumes: usize,
    #[serde(default)]
    pub slice: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub interlace: Option<Vec<RegistrationMeasure>>,
    #[serde(default)]
    pub gradient: Option<Vec<RegistrationMeasure>>,
}

impl RecordedSession {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session {}", path.display()))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse session {}", path.display()))?;
        Ok(session)
    }

    pub fn volume(&self) -> Result<DwiVolume, QcError> {
        DwiVolume::header_only(self.header.clone(), self.volumes)
    }

    pub fn checkers(&self) -> Checkers<'_> {
        Checkers {
            slice: self,
            interlace: self,
            gradient: self,
            conformer: &CropConformer,
            baseline_averager: &MeanBaselineAverager,
            eddy_motion: self,
        }
    }
}

fn pick<T: Clone>(kind: &str, recorded: &Option<Vec<T>>, volume: &DwiVolume) -> Result<Vec<T>> {
    let Some(values) = recorded else {
        bail!("session has no recorded {kind} measurements");
    };
    volume
        .source_index
        .iter()
        .map(|&idx| {
            values
                .get(idx)
                .cloned()
                .with_context(|| format!("no recorded {kind} measurement for volume {idx}"))
        })
        .collect()
}

impl SliceChecker for RecordedSession {
    fn evaluate(&self, volume: &DwiVolume) -> Result<Vec<Vec<f64>>> {
        pick("slice", &self.slice, volume)
    }
}

impl InterlaceChecker for RecordedSession {
    fn evaluate(&self, volume: &DwiVolume) -> Result<Vec<RegistrationMeasure>> {
        pick("interlace", &self.interlace, volume)
    }
}

impl GradientChecker for RecordedSession {
    fn evaluate(
        &self,
        volume: &DwiVolume,
        _gradients: &GradientSet,
    ) -> Result<Vec<RegistrationMeasure>> {
        pick("gradient", &self.gradient, volume)
    }
}

// Recorded gradient measurements already describe corrected data.
impl EddyMotionCorrector for RecordedSession {
    fn correct(
        &self,
        volume: &DwiVolume,
        _gradients: &GradientSet,
        _method: EddyMotionMethod,
    ) -> Result<DwiVolume> {
        Ok(volume.clone())
    }
}
