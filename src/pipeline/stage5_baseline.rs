use tracing::info;

use crate::ctx::Ctx;
use crate::error::QcError;
use crate::pipeline::Stage;

#[derive(Default)]
pub struct Stage5Baseline;

impl Stage5Baseline {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Baseline {
    fn name(&self) -> &'static str {
        "stage5_baseline"
    }

    fn run(&self, ctx: &mut Ctx<'_>) -> Result<(), QcError> {
        if !ctx.protocol.baseline_average.check {
            info!("baseline_average_disabled");
            return Ok(());
        }

        let (volume, gradients) = ctx.working()?;
        let baselines = gradients.baseline_positions().len();
        if baselines < 2 {
            info!(baselines, "baseline_average_skipped");
            return Ok(());
        }
        let averaged = ctx
            .checkers
            .baseline_averager
            .average(volume, gradients)
            .map_err(|e| QcError::collaborator(self.name(), e))?;
        let expected = volume.volumes() - (baselines - 1);
        if averaged.volumes() != expected {
            return Err(QcError::Collaborator {
                stage: self.name(),
                message: format!(
                    "averager returned {} volumes, expected {}",
                    averaged.volumes(),
                    expected
                ),
            });
        }

        let members: Vec<usize> = gradients
            .baseline_positions()
            .into_iter()
            .map(|p| volume.source_index[p])
            .collect();
        let kept = members
            .iter()
            .copied()
            .find(|s| averaged.source_index.contains(s))
            .ok_or_else(|| QcError::Collaborator {
                stage: self.name(),
                message: "averager dropped every baseline".to_string(),
            })?;

        info!(baselines, kept, "baseline_average_ready");
        ctx.replace_working(averaged)?;
        ctx.merged.insert(kept, members);
        Ok(())
    }
}
