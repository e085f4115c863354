use tracing::info;

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::pipeline::Stage;
use crate::statistics::evaluate::check_diffusion;

#[derive(Default)]
pub struct Stage2Diffusion;

impl Stage2Diffusion {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Diffusion {
    fn name(&self) -> &'static str {
        "stage2_diffusion"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        let protocol = ctx.protocol;
        if !protocol.diffusion.check {
            info!("diffusion_check_disabled");
            return Ok(());
        }
        protocol.diffusion.validate()?;

        let (_, gradients) = ctx.working()?;
        let b_value = ctx
            .b_value
            .ok_or_else(|| QcError::Load("b-value missing before diffusion check".to_string()))?;
        let report = check_diffusion(gradients, b_value, &protocol.diffusion);
        info!(
            failed = report.failed(),
            direction_mismatches = report.direction_mismatches.len(),
            "diffusion_check_ready"
        );

        ctx.outcomes.diffusion = Some(report.failed());
        ctx.diffusion = Some(report);
        Ok(())
    }
}
