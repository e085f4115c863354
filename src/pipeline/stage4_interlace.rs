use tracing::info;

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::pipeline::Stage;
use crate::statistics::CheckCategory;
use crate::statistics::collect::collect_registration_statistics;
use crate::statistics::evaluate::evaluate_registration;

#[derive(Default)]
pub struct Stage4Interlace;

impl Stage4Interlace {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Interlace {
    fn name(&self) -> &'static str {
        "stage4_interlace"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        let protocol = ctx.protocol;
        if !protocol.interlace.check {
            info!("interlace_check_disabled");
            return Ok(());
        }
        protocol.interlace.validate()?;

        let (volume, gradients) = ctx.working()?;
        let measures = ctx
            .checkers
            .interlace
            .evaluate(volume)
            .map_err(|e| QcError::collaborator(self.name(), e))?;
        if measures.len() != gradients.len() {
            return Err(QcError::Collaborator {
                stage: self.name(),
                message: format!(
                    "{} interlace measures for {} volumes",
                    measures.len(),
                    gradients.len()
                ),
            });
        }

        let stats = collect_registration_statistics(gradients, &measures);
        let verdict = evaluate_registration(
            gradients,
            &measures,
            &stats,
            &protocol.interlace.thresholds(),
        );
        info!(
            bad_gradients = verdict.bad.len(),
            failed = verdict.failed,
            "interlace_check_ready"
        );

        ctx.interlace_stats = Some(stats);
        ctx.outcomes.interlace = Some(verdict.failed);
        ctx.exclude(&verdict.bad, CheckCategory::InterlaceWise)
    }
}
