use std::collections::{BTreeMap, BTreeSet};

use crate::checkers::Checkers;
use crate::error::QcError;
use crate::geometry::GeometryMismatch;
use crate::gradients::{self, DiffusionCounts, GradientSet};
use crate::protocol::Protocol;
use crate::statistics::evaluate::DiffusionReport;
use crate::statistics::{CheckCategory, RegistrationStatistics, SliceStatistics};
use crate::status::StageOutcomes;
use crate::volume::DwiVolume;

/// State of one QC run. Stages read the inputs and fill in their own slots;
/// nothing here outlives the run.
pub struct Ctx<'a> {
    pub input: &'a DwiVolume,
    pub protocol: &'a Protocol,
    pub checkers: Checkers<'a>,
    pub working: Option<DwiVolume>,
    pub working_gradients: Option<GradientSet>,
    pub gradients: Option<GradientSet>,
    pub b_value: Option<f64>,
    pub outcomes: StageOutcomes,
    pub geometry: Option<GeometryMismatch>,
    pub conformance_forced: bool,
    pub diffusion: Option<DiffusionReport>,
    pub slice_stats: Option<SliceStatistics>,
    pub interlace_stats: Option<RegistrationStatistics>,
    pub gradient_stats: Option<RegistrationStatistics>,
    /// Source index -> category that dropped the volume.
    pub excluded: BTreeMap<usize, CheckCategory>,
    /// Source index of an averaged baseline -> every baseline merged into it.
    pub merged: BTreeMap<usize, Vec<usize>>,
    pub counts: Option<DiffusionCounts>,
    pub surviving: Option<DiffusionCounts>,
    pub warnings: Vec<String>,
}

impl<'a> Ctx<'a> {
    pub fn new(input: &'a DwiVolume, protocol: &'a Protocol, checkers: Checkers<'a>) -> Self {
        Self {
            input,
            protocol,
            checkers,
            working: None,
            working_gradients: None,
            gradients: None,
            b_value: None,
            outcomes: StageOutcomes::default(),
            geometry: None,
            conformance_forced: false,
            diffusion: None,
            slice_stats: None,
            interlace_stats: None,
            gradient_stats: None,
            excluded: BTreeMap::new(),
            merged: BTreeMap::new(),
            counts: None,
            surviving: None,
            warnings: Vec::new(),
        }
    }

    pub fn working(&self) -> Result<(&DwiVolume, &GradientSet), QcError> {
        match (&self.working, &self.working_gradients) {
            (Some(volume), Some(gradients)) => Ok((volume, gradients)),
            _ => Err(QcError::Load(
                "gradient table not loaded before checks".to_string(),
            )),
        }
    }

    /// Installs a new working volume and re-reads its gradient table.
    pub fn replace_working(&mut self, volume: DwiVolume) -> Result<(), QcError> {
        let (set, _) = gradients::load(&volume)?;
        self.working = Some(volume);
        self.working_gradients = Some(set);
        Ok(())
    }

    /// Drops the volumes at `positions` of the working volume and records
    /// their source indices as excluded by `category`. Rejecting an averaged
    /// baseline excludes every baseline merged into it.
    pub fn exclude(&mut self, positions: &[usize], category: CheckCategory) -> Result<(), QcError> {
        if positions.is_empty() {
            return Ok(());
        }
        let (next, sources) = {
            let (volume, _) = self.working()?;
            let dropped: BTreeSet<usize> = positions.iter().copied().collect();
            let keep: Vec<usize> = (0..volume.volumes())
                .filter(|p| !dropped.contains(p))
                .collect();
            let sources: Vec<usize> = dropped.iter().map(|&p| volume.source_index[p]).collect();
            (volume.select(&keep), sources)
        };
        for source in sources {
            let members = self.merged.get(&source).cloned().unwrap_or_default();
            for idx in std::iter::once(source).chain(members) {
                self.excluded.entry(idx).or_insert(category);
            }
        }
        self.replace_working(next)
    }

    pub fn excluded_indices(&self) -> BTreeSet<usize> {
        self.excluded.keys().copied().collect()
    }
}
