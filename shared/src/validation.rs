//! Validation for data entering the decision pipeline
//!
//! Soil providers intermittently omit properties, so soil records are gated
//! here before any feature extraction happens.

use validator::Validate;

use crate::error::{AdvisorError, AdvisorResult};
use crate::models::{FarmerReport, SoilField, SoilObservation, ValidatedSoil};

// ============================================================================
// Soil Validations
// ============================================================================

/// Check that all six required soil fields are present.
///
/// All-or-nothing: the first missing field in declared order is reported and
/// nothing partial is returned.
pub fn validate_soil(observation: &SoilObservation) -> AdvisorResult<ValidatedSoil> {
    if let Some(field) = observation.missing_fields().first() {
        return Err(AdvisorError::validation(field.as_str()));
    }

    let require = |field: SoilField| {
        observation
            .numeric(field)
            .ok_or_else(|| AdvisorError::validation(field.as_str()))
    };

    Ok(ValidatedSoil {
        ph: require(SoilField::Ph)?,
        nitrogen: require(SoilField::Nitrogen)?,
        phosphorus: require(SoilField::Phosphorus)?,
        potassium: require(SoilField::Potassium)?,
        organic_carbon: require(SoilField::OrganicCarbon)?,
        texture_class: observation
            .texture_class
            .clone()
            .ok_or_else(|| AdvisorError::validation(SoilField::TextureClass.as_str()))?,
    })
}

/// Check soil pH is in the physically possible range
pub fn validate_ph(ph: f64) -> Result<(), &'static str> {
    if !(0.0..=14.0).contains(&ph) {
        return Err("pH must be between 0 and 14");
    }
    Ok(())
}

// ============================================================================
// Farmer Report Validations
// ============================================================================

/// Validate the farmer's answers before any network call is made.
///
/// Categorical answers are only checked for emptiness here; membership in the
/// trained vocabularies is the feature codec's job.
pub fn validate_farmer_report(report: &FarmerReport) -> AdvisorResult<()> {
    if !report.previous_yield.is_finite() {
        return Err(AdvisorError::InvalidInput {
            field: "previous_yield".to_string(),
            reason: "must be a number".to_string(),
        });
    }

    report.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .min()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "farmer_report".to_string());
        let reason = match field.as_str() {
            "previous_yield" => format!(
                "must be between 0 and {} bags per acre",
                crate::models::MAX_PREVIOUS_YIELD_BAGS
            ),
            _ => "an answer is required".to_string(),
        };
        AdvisorError::InvalidInput { field, reason }
    })
}

/// Validate free-text location ("County, Sub-county")
pub fn validate_location_text(text: &str) -> Result<(), &'static str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Location is required");
    }
    if trimmed.len() > 200 {
        return Err("Location must be at most 200 characters");
    }
    Ok(())
}

// ============================================================================
// Kenya-Specific Validations
// ============================================================================

/// Approximate bounding box of Kenya: 4.7°S to 5.1°N, 33.9°E to 41.9°E
pub fn is_in_kenya(latitude: f64, longitude: f64) -> bool {
    (-4.7..=5.1).contains(&latitude) && (33.9..=41.9).contains(&longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> SoilObservation {
        SoilObservation {
            ph: Some(6.2),
            nitrogen: Some(1.4),
            phosphorus: Some(18.0),
            potassium: Some(0.9),
            organic_carbon: Some(2.1),
            texture_class: Some("Clay Loam".to_string()),
        }
    }

    #[test]
    fn test_validate_soil_complete() {
        let validated = validate_soil(&complete()).unwrap();
        assert_eq!(validated.into_observation(), complete());
    }

    #[test]
    fn test_validate_soil_names_missing_field() {
        for field in SoilField::ALL {
            let mut observation = complete();
            match field {
                SoilField::TextureClass => observation.texture_class = None,
                numeric => observation.set_numeric(numeric, None),
            }
            let err = validate_soil(&observation).unwrap_err();
            assert_eq!(err, AdvisorError::validation(field.as_str()));
        }
    }

    #[test]
    fn test_validate_soil_reports_first_missing_in_order() {
        let mut observation = complete();
        observation.organic_carbon = None;
        observation.nitrogen = None;
        let err = validate_soil(&observation).unwrap_err();
        assert_eq!(err.field(), Some("nitrogen"));
    }

    #[test]
    fn test_validate_soil_treats_nan_as_missing() {
        let mut observation = complete();
        observation.ph = Some(f64::NAN);
        assert_eq!(
            validate_soil(&observation).unwrap_err(),
            AdvisorError::validation("ph")
        );
    }

    #[test]
    fn test_validate_soil_treats_blank_texture_as_missing() {
        let mut observation = complete();
        observation.texture_class = Some("  ".to_string());
        assert_eq!(
            validate_soil(&observation).unwrap_err(),
            AdvisorError::validation("texture_class")
        );
    }

    #[test]
    fn test_validate_ph() {
        assert!(validate_ph(6.5).is_ok());
        assert!(validate_ph(0.0).is_ok());
        assert!(validate_ph(-1.0).is_err());
        assert!(validate_ph(15.0).is_err());
    }

    #[test]
    fn test_validate_farmer_report() {
        let report = FarmerReport::new(12.0, "gritty and falls apart easily", "maize", "DAP");
        assert!(validate_farmer_report(&report).is_ok());

        let negative = FarmerReport::new(-1.0, "gritty and falls apart easily", "maize", "DAP");
        let err = validate_farmer_report(&negative).unwrap_err();
        assert_eq!(err.field(), Some("previous_yield"));

        let nan = FarmerReport::new(f64::NAN, "gritty and falls apart easily", "maize", "DAP");
        assert_eq!(validate_farmer_report(&nan).unwrap_err().field(), Some("previous_yield"));

        let blank = FarmerReport::new(12.0, "gritty and falls apart easily", "", "DAP");
        assert_eq!(validate_farmer_report(&blank).unwrap_err().field(), Some("previous_crop"));
    }

    #[test]
    fn test_validate_location_text() {
        assert!(validate_location_text("Nakuru, Bahati").is_ok());
        assert!(validate_location_text("   ").is_err());
        assert!(validate_location_text(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_kenya_bounds() {
        assert!(is_in_kenya(-1.286389, 36.817223)); // Nairobi
        assert!(is_in_kenya(0.5143, 35.2698)); // Eldoret
        assert!(!is_in_kenya(-6.7924, 39.2083)); // Dar es Salaam
        assert!(!is_in_kenya(0.3476, 32.5825)); // Kampala
    }
}
