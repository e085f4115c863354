use tracing::info;

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::pipeline::Stage;

#[derive(Default)]
pub struct Stage6EddyMotion;

impl Stage6EddyMotion {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6EddyMotion {
    fn name(&self) -> &'static str {
        "stage6_eddy_motion"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        let protocol = ctx.protocol;
        let eddy = &protocol.eddy_motion;
        if !eddy.check {
            info!("eddy_motion_disabled");
            return Ok(());
        }

        let (volume, gradients) = ctx.working()?;
        let corrected = ctx
            .checkers
            .eddy_motion
            .correct(volume, gradients, eddy.method)
            .map_err(|e| QcError::collaborator(self.name(), e))?;
        if corrected.source_index != volume.source_index {
            return Err(QcError::Collaborator {
                stage: self.name(),
                message: "corrector changed the volume set".to_string(),
            });
        }

        info!(method = ?eddy.method, "eddy_motion_ready");
        ctx.replace_working(corrected)
    }
}
