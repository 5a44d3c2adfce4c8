//! WebAssembly module for the Maize Advisor
//!
//! Provides client-side computation for:
//! - Planting advice from a rainfall series
//! - Soil record validation
//! - Texture classification from sand, silt and clay
//! - Offline checks on location input

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::texture::TextureClass;
use shared::{AdvisoryRules, RainfallAdvisor};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("maize advisor module loaded"));
}

/// Planting advisory for a JSON array of `{date, rainfall_mm}` entries,
/// oldest first, using the default rule thresholds.
#[wasm_bindgen]
pub fn advise_planting(series_json: &str) -> Result<String, JsValue> {
    advise_with_rules(series_json, AdvisoryRules::default()).map_err(|e| JsValue::from_str(&e))
}

/// Same as [`advise_planting`] with thresholds supplied as JSON
#[wasm_bindgen]
pub fn advise_planting_with_rules(series_json: &str, rules_json: &str) -> Result<String, JsValue> {
    let rules: AdvisoryRules = serde_json::from_str(rules_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid rules JSON: {}", e)))?;
    advise_with_rules(series_json, rules).map_err(|e| JsValue::from_str(&e))
}

/// Validate a soil record; returns the record back when all fields are present
#[wasm_bindgen]
pub fn validate_soil_observation(observation_json: &str) -> Result<String, JsValue> {
    check_soil(observation_json).map_err(|e| JsValue::from_str(&e))
}

/// USDA texture class name, or `undefined` if the percentages are invalid
#[wasm_bindgen]
pub fn classify_soil_texture(sand: f64, silt: f64, clay: f64) -> Option<String> {
    TextureClass::classify(sand, silt, clay).map(|class| class.name().to_string())
}

/// Check a location answer before it is sent to the geocoder
#[wasm_bindgen]
pub fn is_valid_location(text: &str) -> bool {
    validate_location_text(text).is_ok()
}

#[wasm_bindgen]
pub fn is_location_in_kenya(latitude: f64, longitude: f64) -> bool {
    is_in_kenya(latitude, longitude)
}

fn advise_with_rules(series_json: &str, rules: AdvisoryRules) -> Result<String, String> {
    rules.validate().map_err(|e| format!("Invalid rules: {}", e))?;
    let series: RainfallSeries =
        serde_json::from_str(series_json).map_err(|e| format!("Invalid rainfall JSON: {}", e))?;

    let advisory = RainfallAdvisor::new(rules)
        .evaluate(&series)
        .map_err(|e| e.to_string())?;
    serde_json::to_string(&advisory).map_err(|e| e.to_string())
}

fn check_soil(observation_json: &str) -> Result<String, String> {
    let observation: SoilObservation = serde_json::from_str(observation_json)
        .map_err(|e| format!("Invalid soil JSON: {}", e))?;
    let validated = validate_soil(&observation).map_err(|e| e.to_string())?;
    serde_json::to_string(&validated).map_err(|e| e.to_string())
}
