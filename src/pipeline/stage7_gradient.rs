use tracing::info;

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::pipeline::Stage;
use crate::statistics::CheckCategory;
use crate::statistics::collect::collect_registration_statistics;
use crate::statistics::evaluate::evaluate_registration;

#[derive(Default)]
pub struct Stage7Gradient;

impl Stage7Gradient {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage7Gradient {
    fn name(&self) -> &'static str {
        "stage7_gradient"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        let protocol = ctx.protocol;
        if !protocol.gradient.check {
            info!("gradient_check_disabled");
            return Ok(());
        }
        protocol.gradient.validate()?;

        let (volume, gradients) = ctx.working()?;
        let measures = ctx
            .checkers
            .gradient
            .evaluate(volume, gradients)
            .map_err(|e| QcError::collaborator(self.name(), e))?;
        if measures.len() != gradients.len() {
            return Err(QcError::Collaborator {
                stage: self.name(),
                message: format!(
                    "{} gradient measures for {} volumes",
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
            &protocol.gradient.thresholds(),
        );
        info!(
            bad_gradients = verdict.bad.len(),
            failed = verdict.failed,
            "gradient_check_ready"
        );

        ctx.gradient_stats = Some(stats);
        ctx.outcomes.gradient = Some(verdict.failed);
        ctx.exclude(&verdict.bad, CheckCategory::GradientWise)
    }
}
