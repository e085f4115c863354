use anyhow::{Result, bail};
use ndarray::{Array3, Axis};

use crate::checkers::BaselineAverager;
use crate::gradients::GradientSet;
use crate::volume::DwiVolume;

/// Voxel-wise mean of all baselines.
pub struct MeanBaselineAverager;

impl BaselineAverager for MeanBaselineAverager {
    fn average(&self, volume: &DwiVolume, gradients: &GradientSet) -> Result<DwiVolume> {
        if gradients.len() != volume.volumes() {
            bail!(
                "gradient table has {} entries for {} volumes",
                gradients.len(),
                volume.volumes()
            );
        }
        let baselines = gradients.baseline_positions();
        if baselines.len() < 2 {
            return Ok(volume.clone());
        }

        let (_, z, y, x) = volume.voxels.dim();
        let mut acc = Array3::<f64>::zeros((z, y, x));
        for &pos in &baselines {
            acc += &volume.voxels.index_axis(Axis(0), pos).mapv(f64::from);
        }
        let count = baselines.len() as f64;
        let averaged = acc.mapv(|v| (v / count).round().clamp(0.0, u16::MAX as f64) as u16);

        let first = baselines[0];
        let keep: Vec<usize> = (0..volume.volumes())
            .filter(|p| *p == first || !baselines.contains(p))
            .collect();
        let mut out = volume.select(&keep);
        let target = keep.iter().position(|&p| p == first).unwrap_or(0);
        out.voxels.index_axis_mut(Axis(0), target).assign(&averaged);
        Ok(out)
    }
}
