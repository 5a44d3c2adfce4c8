//! Common types used across the advisor

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from provider floats. Returns `None` for NaN or infinite input.
    pub fn from_f64(latitude: f64, longitude: f64) -> Option<Self> {
        Some(Self {
            latitude: Decimal::from_f64_retain(latitude)?,
            longitude: Decimal::from_f64_retain(longitude)?,
        })
    }
}

/// A resolved farm location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Location text as the farmer typed it ("County, Sub-county")
    pub raw_text: String,
    pub coordinates: GpsCoordinates,
}

impl Location {
    pub fn new(raw_text: impl Into<String>, coordinates: GpsCoordinates) -> Self {
        Self {
            raw_text: raw_text.into(),
            coordinates,
        }
    }
}

/// Supported languages for farmer-facing messages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Swahili,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Swahili => "sw",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "sw" | "swahili" | "kiswahili" => Some(Language::Swahili),
            _ => None,
        }
    }
}

/// Upstream data providers, used to label transport failures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataProvider {
    Geocoder,
    Soil,
    Rainfall,
}

impl DataProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataProvider::Geocoder => "geocoder",
            DataProvider::Soil => "soil",
            DataProvider::Rainfall => "rainfall",
        }
    }

    pub fn label_sw(&self) -> &'static str {
        match self {
            DataProvider::Geocoder => "ramani",
            DataProvider::Soil => "udongo",
            DataProvider::Rainfall => "mvua",
        }
    }
}

impl std::fmt::Display for DataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
