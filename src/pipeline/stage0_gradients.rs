use tracing::info;

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::gradients;
use crate::pipeline::Stage;
use crate::statistics::evaluate::validate_diffusion;

#[derive(Default)]
pub struct Stage0Gradients;

impl Stage0Gradients {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Gradients {
    fn name(&self) -> &'static str {
        "stage0_gradients"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        let (set, b_value) = gradients::load(ctx.input)?;
        if set.is_empty() {
            return Err(QcError::Metadata("no gradient directions".to_string()));
        }
        let counts = set.counts();
        info!(
            volumes = set.len(),
            b_value,
            baselines = counts.baseline_number,
            directions = counts.gradient_dir_number,
            "gradient_table_ready"
        );

        // Surviving counts never exceed the originals. Stage 8 replaces these
        // flags once exclusions are known.
        ctx.outcomes.validation = Some(validate_diffusion(&counts, &counts, &ctx.protocol.limits));

        ctx.working = Some(ctx.input.clone());
        ctx.working_gradients = Some(set.clone());
        ctx.gradients = Some(set);
        ctx.b_value = Some(b_value);
        ctx.counts = Some(counts);
        Ok(())
    }
}
