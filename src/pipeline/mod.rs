use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::error::QcError;

pub mod stage0_gradients;
pub mod stage1_image;
pub mod stage2_diffusion;
pub mod stage3_slice;
pub mod stage4_interlace;
pub mod stage5_baseline;
pub mod stage6_eddy_motion;
pub mod stage7_gradient;
pub mod stage8_validate;

use stage0_gradients::Stage0Gradients;
use stage1_image::Stage1Image;
use stage2_diffusion::Stage2Diffusion;
use stage3_slice::Stage3Slice;
use stage4_interlace::Stage4Interlace;
use stage5_baseline::Stage5Baseline;
use stage6_eddy_motion::Stage6EddyMotion;
use stage7_gradient::Stage7Gradient;
use stage8_validate::Stage8Validate;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// The full QC order. Stages gate themselves on the protocol; the order
    /// is fixed.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(Stage0Gradients::new()),
            Box::new(Stage1Image::new()),
            Box::new(Stage2Diffusion::new()),
            Box::new(Stage3Slice::new()),
            Box::new(Stage4Interlace::new()),
            Box::new(Stage5Baseline::new()),
            Box::new(Stage6EddyMotion::new()),
            Box::new(Stage7Gradient::new()),
            Box::new(Stage8Validate::new()),
        ])
    }

    pub fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    error = %err,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
