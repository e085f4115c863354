use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::io::QcResultSink;
use crate::qc::QcRun;
use crate::schema::v1::{
    DwiQcV1, ExcludedGradient, GeometryReport, RunReport, StatisticsReport, StatusReport,
};

pub fn build_report(input: &str, run: &QcRun, left: Option<&QcRun>) -> DwiQcV1 {
    DwiQcV1 {
        tool: "kira-dwiqc".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: "v1".to_string(),
        input: input.to_string(),
        run: build_run_report(run),
        left: left.map(build_run_report),
    }
}

pub fn build_run_report(run: &QcRun) -> RunReport {
    RunReport {
        volumes: run.volumes,
        b_value: run.b_value,
        status: StatusReport {
            value: run.status.bits(),
            flags: run.status,
            complete: run.is_complete(),
            error: run.error.as_ref().map(|e| e.to_string()),
        },
        geometry: run.geometry.map(|mismatch| GeometryReport {
            mask: mismatch.bits(),
            mismatch,
            conformance_forced: run.conformance_forced,
        }),
        diffusion: run.diffusion.clone(),
        counts: run.counts.clone(),
        surviving: run.surviving.clone(),
        excluded: run
            .excluded
            .iter()
            .map(|(&index, &category)| ExcludedGradient { index, category })
            .collect(),
        statistics: StatisticsReport {
            slice: run.slice.clone(),
            interlace: run.interlace.clone(),
            gradient: run.gradient.clone(),
        },
        warnings: run.warnings.clone(),
    }
}

pub fn write_json(path: &Path, report: &DwiQcV1) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Writes each recorded report to a fixed JSON path.
pub struct JsonReportSink {
    pub path: PathBuf,
}

impl JsonReportSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl QcResultSink for JsonReportSink {
    fn record(&mut self, report: &DwiQcV1) -> Result<()> {
        write_json(&self.path, report)
    }
}
