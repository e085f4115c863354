use tracing::info;

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::pipeline::Stage;
use crate::statistics::evaluate::validate_diffusion;

#[derive(Default)]
pub struct Stage8Validate;

impl Stage8Validate {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage8Validate {
    fn name(&self) -> &'static str {
        "stage8_validate"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        let protocol = ctx.protocol;
        let limits = &protocol.limits;
        limits.validate()?;

        let gradients = ctx
            .gradients
            .as_ref()
            .ok_or_else(|| QcError::Load("gradient table not loaded before validation".to_string()))?;
        let original = gradients.counts();
        let surviving = gradients.counts_excluding(&ctx.excluded_indices());
        let flags = validate_diffusion(&original, &surviving, limits);
        info!(
            directions_left = surviving.gradient_dir_number,
            gradients_left = surviving.gradient_number,
            baselines_left = surviving.baseline_number,
            too_few_directions = flags.too_few_directions,
            missing_baseline = flags.missing_baseline,
            too_many_bad_gradients = flags.too_many_bad_gradients,
            "diffusion_validation_ready"
        );

        ctx.outcomes.validation = Some(flags);
        ctx.surviving = Some(surviving);
        Ok(())
    }
}
