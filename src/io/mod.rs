use anyhow::Result;

use crate::schema::v1::DwiQcV1;

pub mod json_writer;
pub mod recorded;
pub mod summary;

/// Receiver of finished QC reports. The pipeline only writes to it.
pub trait QcResultSink {
    fn record(&mut self, report: &DwiQcV1) -> Result<()>;
}

impl QcResultSink for Vec<DwiQcV1> {
    fn record(&mut self, report: &DwiQcV1) -> Result<()> {
        self.push(report.clone());
        Ok(())
    }
}
