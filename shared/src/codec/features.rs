//! Feature vector construction
//!
//! The vector layout is fixed: categorical codes in declared field order,
//! then scaled numerics in declared field order. Training and serving must
//! agree on this layout, so it lives in one place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::scaling::ScalingParameters;
use super::vocabulary::CategoryVocabulary;
use crate::error::{AdvisorError, AdvisorResult};
use crate::models::{FarmerReport, SoilField, SoilObservation};

/// Categorical inputs, in feature order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    SoilTextureFeel,
    PreviousCrop,
    FertilizerUsed,
    SoilTextureClass,
}

impl CategoricalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoricalField::SoilTextureFeel => "soil_texture_feel",
            CategoricalField::PreviousCrop => "previous_crop",
            CategoricalField::FertilizerUsed => "fertilizer_used",
            CategoricalField::SoilTextureClass => "soil_texture_class",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CATEGORICAL_FIELDS.into_iter().find(|f| f.as_str() == name)
    }
}

/// Numeric inputs, in feature order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    PreviousYield,
    Ph,
    Nitrogen,
    Phosphorus,
    Potassium,
    OrganicCarbon,
}

impl NumericField {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::PreviousYield => "previous_yield",
            NumericField::Ph => "ph",
            NumericField::Nitrogen => "nitrogen",
            NumericField::Phosphorus => "phosphorus",
            NumericField::Potassium => "potassium",
            NumericField::OrganicCarbon => "organic_carbon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        NUMERIC_FIELDS.into_iter().find(|f| f.as_str() == name)
    }

    /// Soil property backing this feature, `None` for farmer-reported values
    pub fn soil_field(&self) -> Option<SoilField> {
        match self {
            NumericField::PreviousYield => None,
            NumericField::Ph => Some(SoilField::Ph),
            NumericField::Nitrogen => Some(SoilField::Nitrogen),
            NumericField::Phosphorus => Some(SoilField::Phosphorus),
            NumericField::Potassium => Some(SoilField::Potassium),
            NumericField::OrganicCarbon => Some(SoilField::OrganicCarbon),
        }
    }
}

pub const CATEGORICAL_FIELDS: [CategoricalField; 4] = [
    CategoricalField::SoilTextureFeel,
    CategoricalField::PreviousCrop,
    CategoricalField::FertilizerUsed,
    CategoricalField::SoilTextureClass,
];

pub const NUMERIC_FIELDS: [NumericField; 6] = [
    NumericField::PreviousYield,
    NumericField::Ph,
    NumericField::Nitrogen,
    NumericField::Phosphorus,
    NumericField::Potassium,
    NumericField::OrganicCarbon,
];

/// Number of values in every feature vector
pub const FEATURE_WIDTH: usize = CATEGORICAL_FIELDS.len() + NUMERIC_FIELDS.len();

/// Fixed-order numeric encoding fed to the classifier
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Bidirectional mapping between raw attributes and feature vectors.
///
/// Holds the vocabularies and scaling parameters of one training run. It is
/// immutable once built and safe to share across requests.
#[derive(Debug, Clone, Default)]
pub struct FeatureCodec {
    vocabularies: HashMap<CategoricalField, CategoryVocabulary>,
    scaling: Option<ScalingParameters>,
}

impl FeatureCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary(mut self, field: CategoricalField, vocabulary: CategoryVocabulary) -> Self {
        self.vocabularies.insert(field, vocabulary);
        self
    }

    pub fn with_scaling(mut self, scaling: ScalingParameters) -> Self {
        self.scaling = Some(scaling);
        self
    }

    pub fn vocabulary(&self, field: CategoricalField) -> Option<&CategoryVocabulary> {
        self.vocabularies.get(&field)
    }

    fn require_vocabulary(&self, field: CategoricalField) -> AdvisorResult<&CategoryVocabulary> {
        self.vocabularies.get(&field).ok_or_else(|| AdvisorError::NotFitted {
            field: field.as_str().to_string(),
        })
    }

    /// Code for `value`. Fails with `UnknownCategory` for unseen values.
    pub fn encode_categorical(&self, value: &str, field: CategoricalField) -> AdvisorResult<u32> {
        self.require_vocabulary(field)?.encode(value)
    }

    /// Category for `code`, total over `[0, n)`
    pub fn decode_categorical(&self, code: u32, field: CategoricalField) -> AdvisorResult<&str> {
        self.require_vocabulary(field)?.decode(code)
    }

    /// Apply the persisted transforms to `values`, given in `fields` order
    pub fn scale_numeric(&self, values: &[f64], fields: &[NumericField]) -> AdvisorResult<Vec<f64>> {
        let scaling = self.scaling.as_ref().ok_or_else(|| AdvisorError::NotFitted {
            field: "numeric_scaling".to_string(),
        })?;
        if values.len() != fields.len() {
            return Err(AdvisorError::InvalidInput {
                field: "numeric_features".to_string(),
                reason: format!("{} values for {} fields", values.len(), fields.len()),
            });
        }

        values
            .iter()
            .zip(fields)
            .map(|(value, field)| {
                if !value.is_finite() {
                    return Err(AdvisorError::IncompleteInput {
                        field: field.as_str().to_string(),
                    });
                }
                let transform = scaling.get(*field).ok_or_else(|| AdvisorError::NotFitted {
                    field: field.as_str().to_string(),
                })?;
                Ok(transform.apply(*value))
            })
            .collect()
    }

    /// Encode a farmer report and soil record into a feature vector.
    ///
    /// Completeness is checked before any encoding so a missing soil field
    /// is reported as `IncompleteInput` even if a categorical answer is also
    /// unknown.
    pub fn build_feature_vector(
        &self,
        report: &FarmerReport,
        soil: &SoilObservation,
    ) -> AdvisorResult<FeatureVector> {
        let texture = soil.texture().ok_or_else(|| AdvisorError::IncompleteInput {
            field: SoilField::TextureClass.as_str().to_string(),
        })?;

        let numerics = NUMERIC_FIELDS
            .iter()
            .map(|field| match field.soil_field() {
                None => Ok(report.previous_yield),
                Some(soil_field) => {
                    soil.numeric(soil_field)
                        .ok_or_else(|| AdvisorError::IncompleteInput {
                            field: soil_field.as_str().to_string(),
                        })
                }
            })
            .collect::<AdvisorResult<Vec<f64>>>()?;

        let mut features = Vec::with_capacity(FEATURE_WIDTH);
        for field in CATEGORICAL_FIELDS {
            let value = match field {
                CategoricalField::SoilTextureFeel => report.soil_texture_feel.as_str(),
                CategoricalField::PreviousCrop => report.previous_crop.as_str(),
                CategoricalField::FertilizerUsed => report.fertilizer_used.as_str(),
                CategoricalField::SoilTextureClass => texture,
            };
            features.push(f64::from(self.encode_categorical(value, field)?));
        }
        features.extend(self.scale_numeric(&numerics, &NUMERIC_FIELDS)?);

        Ok(FeatureVector(features))
    }
}
