use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::QcError;
use crate::geometry::ImageTolerances;
use crate::statistics::evaluate::RegistrationThresholds;
use crate::volume::ImageGeometry;

/// QC protocol: stage switches and thresholds. Every section falls back to
/// the built-in defaults for fields a protocol file leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Protocol {
    pub image: ImageProtocol,
    pub diffusion: DiffusionProtocol,
    pub slice: SliceProtocol,
    pub interlace: InterlaceProtocol,
    pub baseline_average: BaselineAverageProtocol,
    pub eddy_motion: EddyMotionProtocol,
    pub gradient: GradientProtocol,
    pub limits: DiffusionLimits,
    /// Re-run the checks over the surviving gradients when any were dropped.
    pub qc_left: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            image: ImageProtocol::default(),
            diffusion: DiffusionProtocol::default(),
            slice: SliceProtocol::default(),
            interlace: InterlaceProtocol::default(),
            baseline_average: BaselineAverageProtocol::default(),
            eddy_motion: EddyMotionProtocol::default(),
            gradient: GradientProtocol::default(),
            limits: DiffusionLimits::default(),
            qc_left: true,
        }
    }
}

impl Protocol {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read protocol {}", path.display()))?;
        let protocol = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse protocol {}", path.display()))?;
        Ok(protocol)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageProtocol {
    pub check: bool,
    pub reference: Option<ImageGeometry>,
    pub spacing_tolerance: f64,
    pub origin_tolerance: f64,
    pub direction_tolerance: f64,
    pub force_conformance: bool,
}

impl Default for ImageProtocol {
    fn default() -> Self {
        Self {
            check: true,
            reference: None,
            spacing_tolerance: 1e-3,
            origin_tolerance: 1e-3,
            direction_tolerance: 1e-3,
            force_conformance: false,
        }
    }
}

impl ImageProtocol {
    pub fn validate(&self) -> Result<(), QcError> {
        non_negative("image.spacing_tolerance", self.spacing_tolerance)?;
        non_negative("image.origin_tolerance", self.origin_tolerance)?;
        non_negative("image.direction_tolerance", self.direction_tolerance)
    }

    pub fn tolerances(&self) -> ImageTolerances {
        ImageTolerances {
            spacing: self.spacing_tolerance,
            origin: self.origin_tolerance,
            direction: self.direction_tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionProtocol {
    pub check: bool,
    pub b_value: Option<f64>,
    pub gradients: Option<Vec<[f64; 3]>>,
    pub b_value_tolerance: f64,
    /// Degrees.
    pub direction_tolerance: f64,
}

impl Default for DiffusionProtocol {
    fn default() -> Self {
        Self {
            check: true,
            b_value: None,
            gradients: None,
            b_value_tolerance: 1.0,
            direction_tolerance: 1.0,
        }
    }
}

impl DiffusionProtocol {
    pub fn validate(&self) -> Result<(), QcError> {
        if let Some(b) = self.b_value {
            positive("diffusion.b_value", b)?;
        }
        non_negative("diffusion.b_value_tolerance", self.b_value_tolerance)?;
        non_negative("diffusion.direction_tolerance", self.direction_tolerance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceProtocol {
    pub check: bool,
    /// Fractions of slices ignored at either end of the stack.
    pub head_skip: f64,
    pub tail_skip: f64,
    pub baseline_deviation: f64,
    pub gradient_deviation: f64,
    pub max_bad_gradients: usize,
}

impl Default for SliceProtocol {
    fn default() -> Self {
        Self {
            check: true,
            head_skip: 0.1,
            tail_skip: 0.1,
            baseline_deviation: 3.0,
            gradient_deviation: 3.5,
            max_bad_gradients: 0,
        }
    }
}

impl SliceProtocol {
    pub fn validate(&self) -> Result<(), QcError> {
        fraction("slice.head_skip", self.head_skip)?;
        fraction("slice.tail_skip", self.tail_skip)?;
        if self.head_skip + self.tail_skip >= 1.0 {
            return Err(QcError::Configuration(
                "slice.head_skip + slice.tail_skip must stay below 1".to_string(),
            ));
        }
        positive("slice.baseline_deviation", self.baseline_deviation)?;
        positive("slice.gradient_deviation", self.gradient_deviation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterlaceProtocol {
    pub check: bool,
    pub baseline_correlation: f64,
    pub gradient_correlation: f64,
    pub baseline_deviation: f64,
    pub gradient_deviation: f64,
    /// Millimetres.
    pub translation: f64,
    /// Degrees.
    pub rotation: f64,
    pub max_bad_gradients: usize,
}

impl Default for InterlaceProtocol {
    fn default() -> Self {
        Self {
            check: true,
            baseline_correlation: 0.85,
            gradient_correlation: 0.7595,
            baseline_deviation: 2.5,
            gradient_deviation: 3.0,
            translation: 1.5,
            rotation: 0.5,
            max_bad_gradients: 0,
        }
    }
}

impl InterlaceProtocol {
    pub fn validate(&self) -> Result<(), QcError> {
        fraction("interlace.baseline_correlation", self.baseline_correlation)?;
        fraction("interlace.gradient_correlation", self.gradient_correlation)?;
        positive("interlace.baseline_deviation", self.baseline_deviation)?;
        positive("interlace.gradient_deviation", self.gradient_deviation)?;
        non_negative("interlace.translation", self.translation)?;
        non_negative("interlace.rotation", self.rotation)
    }

    pub fn thresholds(&self) -> RegistrationThresholds {
        RegistrationThresholds {
            baseline_correlation: Some(self.baseline_correlation),
            gradient_correlation: Some(self.gradient_correlation),
            baseline_deviation: self.baseline_deviation,
            gradient_deviation: self.gradient_deviation,
            translation: self.translation,
            rotation: self.rotation,
            max_bad_gradients: self.max_bad_gradients,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineAverageProtocol {
    pub check: bool,
}

impl Default for BaselineAverageProtocol {
    fn default() -> Self {
        Self { check: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EddyMotionMethod {
    Utah,
    Iowa,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EddyMotionProtocol {
    pub check: bool,
    pub method: EddyMotionMethod,
}

impl Default for EddyMotionProtocol {
    fn default() -> Self {
        Self {
            check: true,
            method: EddyMotionMethod::Utah,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientProtocol {
    pub check: bool,
    pub correlation_deviation: f64,
    pub translation: f64,
    pub rotation: f64,
    pub max_bad_gradients: usize,
}

impl Default for GradientProtocol {
    fn default() -> Self {
        Self {
            check: true,
            correlation_deviation: 3.5,
            translation: 2.0,
            rotation: 0.5,
            max_bad_gradients: 0,
        }
    }
}

impl GradientProtocol {
    pub fn validate(&self) -> Result<(), QcError> {
        positive("gradient.correlation_deviation", self.correlation_deviation)?;
        non_negative("gradient.translation", self.translation)?;
        non_negative("gradient.rotation", self.rotation)
    }

    pub fn thresholds(&self) -> RegistrationThresholds {
        RegistrationThresholds {
            baseline_correlation: None,
            gradient_correlation: None,
            baseline_deviation: self.correlation_deviation,
            gradient_deviation: self.correlation_deviation,
            translation: self.translation,
            rotation: self.rotation,
            max_bad_gradients: self.max_bad_gradients,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionLimits {
    pub min_gradient_directions: usize,
    pub max_bad_gradient_fraction: f64,
}

impl Default for DiffusionLimits {
    fn default() -> Self {
        Self {
            min_gradient_directions: 6,
            max_bad_gradient_fraction: 0.1,
        }
    }
}

impl DiffusionLimits {
    pub fn validate(&self) -> Result<(), QcError> {
        if self.min_gradient_directions == 0 {
            return Err(QcError::Configuration(
                "limits.min_gradient_directions must be at least 1".to_string(),
            ));
        }
        fraction("limits.max_bad_gradient_fraction", self.max_bad_gradient_fraction)
    }
}

fn fraction(name: &str, value: f64) -> Result<(), QcError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(QcError::Configuration(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), QcError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(QcError::Configuration(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<(), QcError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(QcError::Configuration(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}
