use crate::gradients::GradientSet;
use crate::math::stats::{mean_std, trim_ends};
use crate::statistics::{
    GroupStatistics, RegistrationMeasure, RegistrationStatistics, SliceStatistics, Statistics,
};

/// Aggregates adjacent-slice correlations (one vector per gradient, in
/// gradient-set order) into per-gradient mean and deviation.
pub fn collect_slice_statistics(
    gradients: &GradientSet,
    correlations: &[Vec<f64>],
    head_skip: f64,
    tail_skip: f64,
) -> SliceStatistics {
    let pairs: Vec<(f64, f64)> = correlations
        .iter()
        .map(|c| mean_std(trim_ends(c, head_skip, tail_skip)))
        .collect();
    let baselines = gradients
        .iter()
        .zip(&pairs)
        .filter(|(d, _)| d.is_baseline())
        .map(|(_, &p)| p);
    SliceStatistics {
        baselines: Statistics::from_pairs(baselines),
        all: Statistics::from_pairs(pairs),
    }
}

/// Group statistics of the per-gradient correlation, split into baselines
/// and diffusion-weighted gradients.
pub fn collect_registration_statistics(
    gradients: &GradientSet,
    measures: &[RegistrationMeasure],
) -> RegistrationStatistics {
    let mut baselines = Vec::new();
    let mut weighted = Vec::new();
    for (d, m) in gradients.iter().zip(measures) {
        if d.is_baseline() {
            baselines.push(m.correlation);
        } else {
            weighted.push(m.correlation);
        }
    }
    RegistrationStatistics {
        baselines: group(&baselines),
        gradients: group(&weighted),
    }
}

pub(crate) fn group(values: &[f64]) -> Option<GroupStatistics> {
    if values.is_empty() {
        return None;
    }
    let (mean, deviation) = mean_std(values);
    Some(GroupStatistics { mean, deviation })
}
