use serde::{Deserialize, Serialize};

pub mod collect;
pub mod evaluate;

/// Check categories that can drop individual gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    SliceWise,
    InterlaceWise,
    GradientWise,
}

impl CheckCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SliceWise => "slice_wise",
            Self::InterlaceWise => "interlace_wise",
            Self::GradientWise => "gradient_wise",
        }
    }
}

/// Per-item mean and deviation of one metric, stored as parallel vectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    means: Vec<f64>,
    deviations: Vec<f64>,
}

impl Statistics {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (means, deviations) = pairs.into_iter().unzip();
        Self { means, deviations }
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn deviations(&self) -> &[f64] {
        &self.deviations
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }
}

/// Mean and deviation of one metric over a whole group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub mean: f64,
    pub deviation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceStatistics {
    /// Indexed like the gradient set the correlations came from.
    pub all: Statistics,
    /// Baseline subset, in gradient-set order.
    pub baselines: Statistics,
}

/// Correlation and rigid-motion estimate for one gradient volume, as
/// produced by the interlace and gradient checkers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegistrationMeasure {
    pub correlation: f64,
    #[serde(default)]
    pub translation: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationStatistics {
    pub baselines: Option<GroupStatistics>,
    pub gradients: Option<GroupStatistics>,
}
