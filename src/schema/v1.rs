use serde::{Deserialize, Serialize};

use crate::geometry::GeometryMismatch;
use crate::gradients::DiffusionCounts;
use crate::statistics::evaluate::DiffusionReport;
use crate::statistics::{CheckCategory, RegistrationStatistics, SliceStatistics};
use crate::status::QcStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub value: u8,
    pub flags: QcStatus,
    pub complete: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryReport {
    pub mask: u8,
    pub mismatch: GeometryMismatch,
    pub conformance_forced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedGradient {
    pub index: usize,
    pub category: CheckCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub slice: Option<SliceStatistics>,
    pub interlace: Option<RegistrationStatistics>,
    pub gradient: Option<RegistrationStatistics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub volumes: usize,
    pub b_value: Option<f64>,
    pub status: StatusReport,
    pub geometry: Option<GeometryReport>,
    pub diffusion: Option<DiffusionReport>,
    pub counts: Option<DiffusionCounts>,
    pub surviving: Option<DiffusionCounts>,
    pub excluded: Vec<ExcludedGradient>,
    pub statistics: StatisticsReport,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DwiQcV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input: String,
    pub run: RunReport,
    pub left: Option<RunReport>,
}
