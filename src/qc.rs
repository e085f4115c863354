use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::checkers::Checkers;
use crate::ctx::Ctx;
use crate::error::QcError;
use crate::geometry::GeometryMismatch;
use crate::gradients::DiffusionCounts;
use crate::pipeline::Pipeline;
use crate::protocol::Protocol;
use crate::statistics::evaluate::DiffusionReport;
use crate::statistics::{CheckCategory, RegistrationStatistics, SliceStatistics};
use crate::status::{QcStatus, StageOutcomes};
use crate::volume::DwiVolume;

/// Everything one QC run determined. When a stage could not execute,
/// `error` is set and the status only reflects the stages that finished.
#[derive(Debug)]
pub struct QcRun {
    pub status: QcStatus,
    pub outcomes: StageOutcomes,
    pub volumes: usize,
    pub b_value: Option<f64>,
    pub geometry: Option<GeometryMismatch>,
    pub conformance_forced: bool,
    pub diffusion: Option<DiffusionReport>,
    pub slice: Option<SliceStatistics>,
    pub interlace: Option<RegistrationStatistics>,
    pub gradient: Option<RegistrationStatistics>,
    pub excluded: BTreeMap<usize, CheckCategory>,
    pub counts: Option<DiffusionCounts>,
    pub surviving: Option<DiffusionCounts>,
    pub source_index: Vec<usize>,
    pub warnings: Vec<String>,
    pub error: Option<QcError>,
}

impl QcRun {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Positions in the input volume that no check excluded.
    pub fn survivors(&self) -> Vec<usize> {
        self.source_index
            .iter()
            .enumerate()
            .filter(|(_, s)| !self.excluded.contains_key(s))
            .map(|(pos, _)| pos)
            .collect()
    }
}

pub fn run_qc(volume: &DwiVolume, protocol: &Protocol, checkers: Checkers<'_>) -> QcRun {
    let mut ctx = Ctx::new(volume, protocol, checkers);
    let result = Pipeline::standard().run(&mut ctx);
    let status = QcStatus::encode(&ctx.outcomes);
    match &result {
        Ok(()) => info!(status = status.bits(), "qc_run_complete"),
        Err(err) => warn!(status = status.bits(), error = %err, "qc_run_incomplete"),
    }
    QcRun {
        status,
        outcomes: ctx.outcomes,
        volumes: volume.volumes(),
        b_value: ctx.b_value,
        geometry: ctx.geometry,
        conformance_forced: ctx.conformance_forced,
        diffusion: ctx.diffusion,
        slice: ctx.slice_stats,
        interlace: ctx.interlace_stats,
        gradient: ctx.gradient_stats,
        excluded: ctx.excluded,
        counts: ctx.counts,
        surviving: ctx.surviving,
        source_index: volume.source_index.clone(),
        warnings: ctx.warnings,
        error: result.err(),
    }
}

/// Second, independent run over the gradients the first run kept. Returns
/// `None` when the first run is incomplete or dropped nothing.
pub fn run_left(
    volume: &DwiVolume,
    first: &QcRun,
    protocol: &Protocol,
    checkers: Checkers<'_>,
) -> Option<QcRun> {
    if !first.is_complete() || first.excluded.is_empty() {
        return None;
    }
    let survivors = first.survivors();
    if survivors.is_empty() {
        warn!("no gradients left for a second pass");
        return None;
    }
    info!(volumes = survivors.len(), "qc_left_started");
    let left = volume.select(&survivors);
    Some(run_qc(&left, protocol, checkers))
}
