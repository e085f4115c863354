use serde::{Deserialize, Serialize};

use crate::gradients::{DiffusionCounts, GradientSet, dot, norm};
use crate::protocol::{DiffusionLimits, DiffusionProtocol, SliceProtocol};
use crate::statistics::collect::group;
use crate::statistics::{GroupStatistics, RegistrationMeasure, RegistrationStatistics, SliceStatistics};
use crate::status::ValidationFlags;

// Group deviations below this are treated as zero spread.
const MIN_DEVIATION: f64 = 1e-9;
const ZERO_NORM: f64 = 1e-6;

/// Classification of one check category. `bad` holds positions in the
/// gradient set that was evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub bad: Vec<usize>,
    pub failed: bool,
}

impl Verdict {
    fn from_bad(bad: Vec<usize>, max_bad: usize) -> Self {
        let failed = bad.len() > max_bad;
        Self { bad, failed }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistrationThresholds {
    pub baseline_correlation: Option<f64>,
    pub gradient_correlation: Option<f64>,
    pub baseline_deviation: f64,
    pub gradient_deviation: f64,
    pub translation: f64,
    pub rotation: f64,
    pub max_bad_gradients: usize,
}

pub fn evaluate_slice(
    gradients: &GradientSet,
    stats: &SliceStatistics,
    protocol: &SliceProtocol,
) -> Verdict {
    let means = stats.all.means();
    let deviations = stats.all.deviations();

    let mut weighted_means = Vec::new();
    let mut weighted_devs = Vec::new();
    for (pos, d) in gradients.iter().enumerate() {
        if !d.is_baseline() {
            weighted_means.push(means[pos]);
            weighted_devs.push(deviations[pos]);
        }
    }
    let baseline_band = (
        group(stats.baselines.means()),
        group(stats.baselines.deviations()),
    );
    let weighted_band = (group(&weighted_means), group(&weighted_devs));

    let bad = gradients
        .iter()
        .enumerate()
        .filter(|(pos, d)| {
            let ((mean_group, dev_group), k) = if d.is_baseline() {
                (baseline_band, protocol.baseline_deviation)
            } else {
                (weighted_band, protocol.gradient_deviation)
            };
            below_band(means[*pos], mean_group, k) || above_band(deviations[*pos], dev_group, k)
        })
        .map(|(pos, _)| pos)
        .collect();
    Verdict::from_bad(bad, protocol.max_bad_gradients)
}

pub fn evaluate_registration(
    gradients: &GradientSet,
    measures: &[RegistrationMeasure],
    stats: &RegistrationStatistics,
    thresholds: &RegistrationThresholds,
) -> Verdict {
    let bad = gradients
        .iter()
        .zip(measures)
        .enumerate()
        .filter(|(_, (d, m))| {
            let (floor, band, k) = if d.is_baseline() {
                (
                    thresholds.baseline_correlation,
                    stats.baselines,
                    thresholds.baseline_deviation,
                )
            } else {
                (
                    thresholds.gradient_correlation,
                    stats.gradients,
                    thresholds.gradient_deviation,
                )
            };
            floor.is_some_and(|f| m.correlation < f)
                || below_band(m.correlation, band, k)
                || max_abs(&m.translation) > thresholds.translation
                || max_abs(&m.rotation) > thresholds.rotation
        })
        .map(|(pos, _)| pos)
        .collect();
    Verdict::from_bad(bad, thresholds.max_bad_gradients)
}

/// Bits 0-2 of the status, judged on what survived the gradient checks.
pub fn validate_diffusion(
    original: &DiffusionCounts,
    surviving: &DiffusionCounts,
    limits: &DiffusionLimits,
) -> ValidationFlags {
    let bad = original
        .gradient_number
        .saturating_sub(surviving.gradient_number);
    let allowed =
        (limits.max_bad_gradient_fraction * original.gradient_number as f64 + 1e-9).floor() as usize;
    ValidationFlags {
        too_few_directions: surviving.gradient_dir_number < limits.min_gradient_directions,
        missing_baseline: surviving.baseline_number == 0 && surviving.b_value_number == 1,
        too_many_bad_gradients: bad > allowed,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffusionReport {
    pub invalid_b_value: bool,
    pub b_value_mismatch: bool,
    pub gradient_count_mismatch: bool,
    /// Positions whose direction or weighting differs from the protocol.
    pub direction_mismatches: Vec<usize>,
}

impl DiffusionReport {
    pub fn failed(&self) -> bool {
        self.invalid_b_value
            || self.b_value_mismatch
            || self.gradient_count_mismatch
            || !self.direction_mismatches.is_empty()
    }
}

/// Compares the loaded diffusion information with what the protocol
/// expects. Only expectations the protocol states are checked, apart from
/// the b-value sanity check.
pub fn check_diffusion(
    gradients: &GradientSet,
    b_value: f64,
    protocol: &DiffusionProtocol,
) -> DiffusionReport {
    let mut report = DiffusionReport {
        invalid_b_value: !(b_value > 0.0),
        ..DiffusionReport::default()
    };
    if let Some(expected) = protocol.b_value {
        report.b_value_mismatch = (expected - b_value).abs() > protocol.b_value_tolerance;
    }
    if let Some(expected) = &protocol.gradients {
        if expected.len() != gradients.len() {
            report.gradient_count_mismatch = true;
        } else {
            report.direction_mismatches = gradients
                .iter()
                .zip(expected)
                .enumerate()
                .filter(|(_, (d, e))| !same_gradient(&d.vector, e, b_value, protocol))
                .map(|(pos, _)| pos)
                .collect();
        }
    }
    report
}

fn same_gradient(
    actual: &[f64; 3],
    expected: &[f64; 3],
    b_value: f64,
    protocol: &DiffusionProtocol,
) -> bool {
    let (na, ne) = (norm(actual), norm(expected));
    match (na < ZERO_NORM, ne < ZERO_NORM) {
        (true, true) => return true,
        (true, false) | (false, true) => return false,
        (false, false) => {}
    }
    let cos = (dot(actual, expected) / (na * ne)).clamp(-1.0, 1.0);
    let angle = cos.acos().to_degrees();
    let weighting = (na * na - ne * ne).abs() * b_value;
    angle <= protocol.direction_tolerance && weighting <= protocol.b_value_tolerance
}

fn below_band(value: f64, group: Option<GroupStatistics>, k: f64) -> bool {
    matches!(group, Some(g) if g.deviation > MIN_DEVIATION && value < g.mean - k * g.deviation)
}

fn above_band(value: f64, group: Option<GroupStatistics>, k: f64) -> bool {
    matches!(group, Some(g) if g.deviation > MIN_DEVIATION && value > g.mean + k * g.deviation)
}

fn max_abs(v: &[f64; 3]) -> f64 {
    v.iter().fold(0.0, |acc: f64, x| acc.max(x.abs()))
}
