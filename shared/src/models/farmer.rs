//! Farmer-reported history

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upper bound on a plausible maize yield, in 90 kg bags per acre
pub const MAX_PREVIOUS_YIELD_BAGS: f64 = 200.0;

/// Answers collected from the farmer
///
/// Categorical answers are kept as the raw text the farmer chose. They are
/// only checked against the trained vocabularies by the feature codec, so an
/// unexpected answer surfaces as an `UnknownCategory` error rather than being
/// silently mapped to a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct FarmerReport {
    /// Previous maize harvest in bags per acre
    #[validate(range(min = 0.0, max = 200.0))]
    pub previous_yield: f64,

    /// How the soil feels when rubbed between the fingers
    #[validate(length(min = 1))]
    pub soil_texture_feel: String,

    /// Crop grown in the previous season
    #[validate(length(min = 1))]
    pub previous_crop: String,

    /// Fertilizer applied in the previous season
    #[validate(length(min = 1))]
    pub fertilizer_used: String,
}

impl FarmerReport {
    pub fn new(
        previous_yield: f64,
        soil_texture_feel: impl Into<String>,
        previous_crop: impl Into<String>,
        fertilizer_used: impl Into<String>,
    ) -> Self {
        Self {
            previous_yield,
            soil_texture_feel: soil_texture_feel.into(),
            previous_crop: previous_crop.into(),
            fertilizer_used: fertilizer_used.into(),
        }
    }
}

/// Soil feel answers offered to farmers
pub const SOIL_TEXTURE_FEEL_OPTIONS: &[&str] = &[
    "gritty and falls apart easily",
    "smooth and sticky - forms a ball",
    "soft and holds together loosely",
    "smooth like flour but not sticky",
];

/// Previous crop answers offered to farmers
pub const PREVIOUS_CROP_OPTIONS: &[&str] = &["maize", "beans", "wheat", "potatoes", "others"];

/// Previous fertilizer answers offered to farmers
pub const FERTILIZER_USED_OPTIONS: &[&str] = &["DAP", "CAN", "Urea", "Compost"];
