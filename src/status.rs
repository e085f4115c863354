use serde::{Deserialize, Serialize};

/// Problems derived from the surviving gradient table (bits 0-2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFlags {
    pub too_few_directions: bool,
    pub missing_baseline: bool,
    pub too_many_bad_gradients: bool,
}

/// Per-stage QC verdicts of one run. `Some(true)` means the stage found a
/// problem, `None` that it was disabled or never reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageOutcomes {
    pub image: Option<bool>,
    pub diffusion: Option<bool>,
    pub slice: Option<bool>,
    pub interlace: Option<bool>,
    pub gradient: Option<bool>,
    pub validation: Option<ValidationFlags>,
}

/// Eight-bit QC status. A set flag means a problem was detected; the all
/// clear status encodes to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcStatus {
    pub too_few_directions: bool,
    pub missing_baseline: bool,
    pub too_many_bad_gradients: bool,
    pub image_mismatch: bool,
    pub diffusion_mismatch: bool,
    pub slice_wise_failed: bool,
    pub interlace_wise_failed: bool,
    pub gradient_wise_failed: bool,
}

impl QcStatus {
    pub const TOO_FEW_DIRECTIONS: u8 = 1 << 0;
    pub const MISSING_BASELINE: u8 = 1 << 1;
    pub const TOO_MANY_BAD_GRADIENTS: u8 = 1 << 2;
    pub const IMAGE_MISMATCH: u8 = 1 << 3;
    pub const DIFFUSION_MISMATCH: u8 = 1 << 4;
    pub const SLICE_WISE: u8 = 1 << 5;
    pub const INTERLACE_WISE: u8 = 1 << 6;
    pub const GRADIENT_WISE: u8 = 1 << 7;

    pub fn encode(outcomes: &StageOutcomes) -> Self {
        let validation = outcomes.validation.unwrap_or_default();
        Self {
            too_few_directions: validation.too_few_directions,
            missing_baseline: validation.missing_baseline,
            too_many_bad_gradients: validation.too_many_bad_gradients,
            image_mismatch: outcomes.image.unwrap_or(false),
            diffusion_mismatch: outcomes.diffusion.unwrap_or(false),
            slice_wise_failed: outcomes.slice.unwrap_or(false),
            interlace_wise_failed: outcomes.interlace.unwrap_or(false),
            gradient_wise_failed: outcomes.gradient.unwrap_or(false),
        }
    }

    pub fn bits(&self) -> u8 {
        self.flags()
            .iter()
            .filter(|(_, set, _)| *set)
            .fold(0, |acc, (bit, _, _)| acc | bit)
    }

    pub fn from_bits(bits: u8) -> Self {
        Self {
            too_few_directions: bits & Self::TOO_FEW_DIRECTIONS != 0,
            missing_baseline: bits & Self::MISSING_BASELINE != 0,
            too_many_bad_gradients: bits & Self::TOO_MANY_BAD_GRADIENTS != 0,
            image_mismatch: bits & Self::IMAGE_MISMATCH != 0,
            diffusion_mismatch: bits & Self::DIFFUSION_MISMATCH != 0,
            slice_wise_failed: bits & Self::SLICE_WISE != 0,
            interlace_wise_failed: bits & Self::INTERLACE_WISE != 0,
            gradient_wise_failed: bits & Self::GRADIENT_WISE != 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.bits() == 0
    }

    /// Names of the set flags, low bit first.
    pub fn fired(&self) -> Vec<&'static str> {
        self.flags()
            .iter()
            .filter(|(_, set, _)| *set)
            .map(|(_, _, name)| *name)
            .collect()
    }

    fn flags(&self) -> [(u8, bool, &'static str); 8] {
        [
            (
                Self::TOO_FEW_DIRECTIONS,
                self.too_few_directions,
                "too_few_directions",
            ),
            (
                Self::MISSING_BASELINE,
                self.missing_baseline,
                "missing_baseline",
            ),
            (
                Self::TOO_MANY_BAD_GRADIENTS,
                self.too_many_bad_gradients,
                "too_many_bad_gradients",
            ),
            (Self::IMAGE_MISMATCH, self.image_mismatch, "image_mismatch"),
            (
                Self::DIFFUSION_MISMATCH,
                self.diffusion_mismatch,
                "diffusion_mismatch",
            ),
            (Self::SLICE_WISE, self.slice_wise_failed, "slice_wise"),
            (
                Self::INTERLACE_WISE,
                self.interlace_wise_failed,
                "interlace_wise",
            ),
            (Self::GRADIENT_WISE, self.gradient_wise_failed, "gradient_wise"),
        ]
    }
}
