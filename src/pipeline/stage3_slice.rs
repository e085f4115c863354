use tracing::info;

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::pipeline::Stage;
use crate::statistics::CheckCategory;
use crate::statistics::collect::collect_slice_statistics;
use crate::statistics::evaluate::evaluate_slice;

#[derive(Default)]
pub struct Stage3Slice;

impl Stage3Slice {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Slice {
    fn name(&self) -> &'static str {
        "stage3_slice"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        let protocol = ctx.protocol;
        if !protocol.slice.check {
            info!("slice_check_disabled");
            return Ok(());
        }
        protocol.slice.validate()?;

        let (volume, gradients) = ctx.working()?;
        let correlations = ctx
            .checkers
            .slice
            .evaluate(volume)
            .map_err(|e| QcError::collaborator(self.name(), e))?;
        if correlations.len() != gradients.len() {
            return Err(QcError::Collaborator {
                stage: self.name(),
                message: format!(
                    "{} correlation vectors for {} volumes",
                    correlations.len(),
                    gradients.len()
                ),
            });
        }

        let stats = collect_slice_statistics(
            gradients,
            &correlations,
            protocol.slice.head_skip,
            protocol.slice.tail_skip,
        );
        let verdict = evaluate_slice(gradients, &stats, &protocol.slice);
        info!(
            bad_gradients = verdict.bad.len(),
            failed = verdict.failed,
            "slice_check_ready"
        );

        ctx.slice_stats = Some(stats);
        ctx.outcomes.slice = Some(verdict.failed);
        ctx.exclude(&verdict.bad, CheckCategory::SliceWise)
    }
}
