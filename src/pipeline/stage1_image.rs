use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::geometry::check_geometry;
use crate::pipeline::Stage;

#[derive(Default)]
pub struct Stage1Image;

impl Stage1Image {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Image {
    fn name(&self) -> &'static str {
        "stage1_image"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        let protocol = ctx.protocol;
        let image = &protocol.image;
        if !image.check {
            info!("image_check_disabled");
            return Ok(());
        }
        image.validate()?;

        let (volume, _) = ctx.working()?;
        let reference = image
            .reference
            .clone()
            .unwrap_or_else(|| volume.header.geometry.clone());
        let mismatch = check_geometry(&volume.header.geometry, &reference, &image.tolerances());
        info!(mask = mismatch.bits(), "image_check_ready");

        if mismatch.any() && image.force_conformance {
            let conformed = ctx
                .checkers
                .conformer
                .conform(volume, &reference)
                .map_err(|e| QcError::collaborator(self.name(), e))?;
            if conformed.volumes() != volume.volumes() {
                return Err(QcError::Collaborator {
                    stage: self.name(),
                    message: format!(
                        "conformer returned {} volumes for {}",
                        conformed.volumes(),
                        volume.volumes()
                    ),
                });
            }
            warn!(mask = mismatch.bits(), "forced_conformance_applied");
            ctx.warnings
                .push(format!("geometry mismatch 0x{:02x}; conformance forced", mismatch.bits()));
            ctx.replace_working(conformed)?;
            ctx.conformance_forced = true;
        }

        ctx.geometry = Some(mismatch);
        ctx.outcomes.image = Some(mismatch.any());
        Ok(())
    }
}
