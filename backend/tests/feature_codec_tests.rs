//! Feature encoding and soil validation tests
//!
//! Tests for the serving-side encoding including:
//! - Feature vectors built from loaded artifacts
//! - Unknown categories and incomplete soil records
//! - Soil validation ahead of encoding

mod common;

use common::{bundle, report, soil};
use proptest::prelude::*;
use shared::texture::TextureClass;
use shared::*;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_feature_vector_layout() {
        let bundle = bundle();
        let features = bundle.codec().build_feature_vector(&report(), &soil(6.2)).unwrap();
        let values = features.as_slice();

        assert_eq!(values.len(), FEATURE_WIDTH);
        // "smooth and sticky - forms a ball", "beans", "DAP", "Clay Loam"
        assert_eq!(&values[..3], &[1.0, 1.0, 0.0]);
        let clay_loam = TextureClass::ALL
            .iter()
            .position(|c| c.name() == "Clay Loam")
            .unwrap();
        assert_eq!(values[3], clay_loam as f64);
        // previous yield 12 and pH 6.2 on a 0..10 min-max scale
        assert!((values[4] - 1.2).abs() < 1e-9);
        assert!((values[5] - 0.62).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_crop() {
        let mut report = report();
        report.previous_crop = "rice".to_string();
        let err = bundle().codec().build_feature_vector(&report, &soil(6.2)).unwrap_err();
        assert_eq!(err, AdvisorError::unknown_category("previous_crop", "rice"));
    }

    #[test]
    fn test_unknown_texture_feel() {
        let err = bundle()
            .codec()
            .encode_categorical("muddy", CategoricalField::SoilTextureFeel)
            .unwrap_err();
        assert_eq!(err, AdvisorError::unknown_category("soil_texture_feel", "muddy"));
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let mut report = report();
        report.fertilizer_used = "dap".to_string();
        let err = bundle().codec().build_feature_vector(&report, &soil(6.2)).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_CATEGORY");
    }

    #[test]
    fn test_missing_soil_field_is_incomplete() {
        let mut record = soil(6.2);
        record.organic_carbon = None;
        let err = bundle().codec().build_feature_vector(&report(), &record).unwrap_err();
        assert_eq!(
            err,
            AdvisorError::IncompleteInput {
                field: "organic_carbon".to_string()
            }
        );
    }

    #[test]
    fn test_unfitted_codec() {
        let err = FeatureCodec::new()
            .encode_categorical("maize", CategoricalField::PreviousCrop)
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FITTED");
    }

    #[test]
    fn test_decode_round_trip_over_vocabulary() {
        let bundle = bundle();
        let codec = bundle.codec();
        for (code, crop) in PREVIOUS_CROP_OPTIONS.iter().enumerate() {
            assert_eq!(
                codec.decode_categorical(code as u32, CategoricalField::PreviousCrop).unwrap(),
                *crop
            );
        }
        assert!(codec
            .decode_categorical(PREVIOUS_CROP_OPTIONS.len() as u32, CategoricalField::PreviousCrop)
            .is_err());
    }

    #[test]
    fn test_validate_soil_complete() {
        let validated = validate_soil(&soil(6.2)).unwrap();
        assert_eq!(validated.texture_class(), "Clay Loam");
        assert_eq!(validated.into_observation(), soil(6.2));
    }

    /// The first missing field in declared order is reported
    #[test]
    fn test_validate_soil_reports_first_missing() {
        let mut record = soil(6.2);
        record.texture_class = None;
        record.nitrogen = None;
        assert_eq!(validate_soil(&record).unwrap_err(), AdvisorError::validation("nitrogen"));
    }

    #[test]
    fn test_validate_soil_rejects_nan() {
        let mut record = soil(6.2);
        record.phosphorus = Some(f64::NAN);
        assert_eq!(
            validate_soil(&record).unwrap_err(),
            AdvisorError::validation("phosphorus")
        );
    }

    #[test]
    fn test_validate_farmer_report() {
        assert!(validate_farmer_report(&report()).is_ok());

        let mut too_high = report();
        too_high.previous_yield = MAX_PREVIOUS_YIELD_BAGS + 1.0;
        assert_eq!(validate_farmer_report(&too_high).unwrap_err().field(), Some("previous_yield"));

        let mut blank = report();
        blank.previous_crop = String::new();
        assert_eq!(validate_farmer_report(&blank).unwrap_err().field(), Some("previous_crop"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn optional_value() -> impl Strategy<Value = Option<f64>> {
        prop::option::of(0.0f64..=20.0)
    }

    fn texture_strategy() -> impl Strategy<Value = Option<String>> {
        prop::option::of(
            prop::sample::select(TextureClass::ALL.to_vec()).prop_map(|c| c.name().to_string()),
        )
    }

    fn soil_strategy() -> impl Strategy<Value = SoilObservation> {
        (
            optional_value(),
            optional_value(),
            optional_value(),
            optional_value(),
            optional_value(),
            texture_strategy(),
        )
            .prop_map(|(ph, nitrogen, phosphorus, potassium, organic_carbon, texture_class)| {
                SoilObservation {
                    ph,
                    nitrogen,
                    phosphorus,
                    potassium,
                    organic_carbon,
                    texture_class,
                }
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Validation succeeds exactly when no field is missing
        #[test]
        fn prop_validation_all_or_nothing(record in soil_strategy()) {
            let missing = record.missing_fields();
            match validate_soil(&record) {
                Ok(_) => prop_assert!(missing.is_empty()),
                Err(err) => prop_assert_eq!(err, AdvisorError::validation(missing[0].as_str())),
            }
        }

        /// Every successful encoding has the same width
        #[test]
        fn prop_feature_width_constant(
            previous_yield in 0.0f64..=200.0,
            feel in prop::sample::select(SOIL_TEXTURE_FEEL_OPTIONS),
            crop in prop::sample::select(PREVIOUS_CROP_OPTIONS),
            ph in 3.5f64..=9.0,
        ) {
            let bundle = bundle();
            let report = FarmerReport::new(previous_yield, feel, crop, "Urea");
            let features = bundle.codec().build_feature_vector(&report, &soil(ph)).unwrap();
            prop_assert_eq!(features.len(), FEATURE_WIDTH);
        }
    }
}
