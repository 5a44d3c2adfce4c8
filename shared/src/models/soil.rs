//! Soil observation models

use serde::{Deserialize, Serialize};

/// The six soil properties a recommendation needs, in declared order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SoilField {
    Ph,
    Nitrogen,
    Phosphorus,
    Potassium,
    OrganicCarbon,
    TextureClass,
}

impl SoilField {
    pub const ALL: [SoilField; 6] = [
        SoilField::Ph,
        SoilField::Nitrogen,
        SoilField::Phosphorus,
        SoilField::Potassium,
        SoilField::OrganicCarbon,
        SoilField::TextureClass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilField::Ph => "ph",
            SoilField::Nitrogen => "nitrogen",
            SoilField::Phosphorus => "phosphorus",
            SoilField::Potassium => "potassium",
            SoilField::OrganicCarbon => "organic_carbon",
            SoilField::TextureClass => "texture_class",
        }
    }
}

impl std::fmt::Display for SoilField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw soil record as returned by a soil provider. Any field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SoilObservation {
    pub ph: Option<f64>,
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub organic_carbon: Option<f64>,
    /// USDA texture class name, e.g. "Clay Loam"
    pub texture_class: Option<String>,
}

impl SoilObservation {
    /// Numeric value of a field. Non-finite values count as absent.
    /// Always `None` for `TextureClass`.
    pub fn numeric(&self, field: SoilField) -> Option<f64> {
        let value = match field {
            SoilField::Ph => self.ph,
            SoilField::Nitrogen => self.nitrogen,
            SoilField::Phosphorus => self.phosphorus,
            SoilField::Potassium => self.potassium,
            SoilField::OrganicCarbon => self.organic_carbon,
            SoilField::TextureClass => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// Texture class, ignoring blank strings
    pub fn texture(&self) -> Option<&str> {
        self.texture_class
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn is_present(&self, field: SoilField) -> bool {
        match field {
            SoilField::TextureClass => self.texture().is_some(),
            numeric => self.numeric(numeric).is_some(),
        }
    }

    /// Fields that are absent, in declared order
    pub fn missing_fields(&self) -> Vec<SoilField> {
        SoilField::ALL
            .into_iter()
            .filter(|f| !self.is_present(*f))
            .collect()
    }

    pub fn set_numeric(&mut self, field: SoilField, value: Option<f64>) {
        match field {
            SoilField::Ph => self.ph = value,
            SoilField::Nitrogen => self.nitrogen = value,
            SoilField::Phosphorus => self.phosphorus = value,
            SoilField::Potassium => self.potassium = value,
            SoilField::OrganicCarbon => self.organic_carbon = value,
            SoilField::TextureClass => {}
        }
    }
}

/// A soil record with every required field present.
///
/// Only [`crate::validation::validate_soil`] constructs this type.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidatedSoil {
    pub(crate) ph: f64,
    pub(crate) nitrogen: f64,
    pub(crate) phosphorus: f64,
    pub(crate) potassium: f64,
    pub(crate) organic_carbon: f64,
    pub(crate) texture_class: String,
}

impl ValidatedSoil {
    pub fn numeric(&self, field: SoilField) -> Option<f64> {
        match field {
            SoilField::Ph => Some(self.ph),
            SoilField::Nitrogen => Some(self.nitrogen),
            SoilField::Phosphorus => Some(self.phosphorus),
            SoilField::Potassium => Some(self.potassium),
            SoilField::OrganicCarbon => Some(self.organic_carbon),
            SoilField::TextureClass => None,
        }
    }

    pub fn texture_class(&self) -> &str {
        &self.texture_class
    }

    /// Back to the provider shape, unchanged
    pub fn into_observation(self) -> SoilObservation {
        SoilObservation {
            ph: Some(self.ph),
            nitrogen: Some(self.nitrogen),
            phosphorus: Some(self.phosphorus),
            potassium: Some(self.potassium),
            organic_carbon: Some(self.organic_carbon),
            texture_class: Some(self.texture_class),
        }
    }
}
