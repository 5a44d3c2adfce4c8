//! ISRIC SoilGrids v2.0 client
//!
//! Queries the topsoil layer mean for each property and converts mapped
//! integer units back to conventional units with the layer's `d_factor`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use shared::{
    texture::TextureClass, validate_ph, AdvisorResult, DataProvider, GpsCoordinates, SoilField,
    SoilObservation,
};

use super::http::HttpTransport;
use super::SoilDataSource;
use crate::config::{HttpConfig, SoilConfig};
use crate::error::AppResult;

/// SoilGrids property names and the soil field each one fills
const PROPERTY_FIELDS: [(&str, SoilField); 5] = [
    ("phh2o", SoilField::Ph),
    ("nitrogen", SoilField::Nitrogen),
    ("phosphorus", SoilField::Phosphorus),
    ("potassium", SoilField::Potassium),
    ("ocd", SoilField::OrganicCarbon),
];

/// Particle size fractions used to derive the texture class
const TEXTURE_PROPERTIES: [&str; 3] = ["sand", "silt", "clay"];

/// SoilGrids client
#[derive(Clone)]
pub struct SoilGridsClient {
    transport: HttpTransport,
    base_url: String,
    depth: String,
}

/// SoilGrids properties/query response
#[derive(Debug, Deserialize)]
struct SoilGridsResponse {
    properties: SoilGridsProperties,
}

#[derive(Debug, Deserialize)]
struct SoilGridsProperties {
    #[serde(default)]
    layers: Vec<SoilGridsLayer>,
}

#[derive(Debug, Deserialize)]
struct SoilGridsLayer {
    name: String,
    unit_measure: SoilGridsUnits,
    #[serde(default)]
    depths: Vec<SoilGridsDepth>,
}

#[derive(Debug, Deserialize)]
struct SoilGridsUnits {
    d_factor: f64,
}

#[derive(Debug, Deserialize)]
struct SoilGridsDepth {
    label: String,
    values: SoilGridsValues,
}

#[derive(Debug, Deserialize)]
struct SoilGridsValues {
    mean: Option<f64>,
}

impl SoilGridsClient {
    pub fn new(config: &SoilConfig, http: &HttpConfig) -> AppResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(DataProvider::Soil, http)?,
            base_url: config.api_endpoint.clone(),
            depth: config.depth.clone(),
        })
    }

    /// Mean per property at the configured depth, in conventional units
    fn layer_means(&self, data: SoilGridsResponse) -> HashMap<String, f64> {
        data.properties
            .layers
            .into_iter()
            .filter_map(|layer| {
                let mean = layer
                    .depths
                    .iter()
                    .find(|d| d.label == self.depth)
                    .and_then(|d| d.values.mean)?;
                let d_factor = if layer.unit_measure.d_factor == 0.0 {
                    1.0
                } else {
                    layer.unit_measure.d_factor
                };
                Some((layer.name, mean / d_factor))
            })
            .collect()
    }

    fn convert_response(&self, data: SoilGridsResponse) -> SoilObservation {
        let means = self.layer_means(data);
        let mut observation = SoilObservation::default();

        for (property, field) in PROPERTY_FIELDS {
            observation.set_numeric(field, means.get(property).copied());
        }

        if let Some(ph) = observation.ph {
            if let Err(reason) = validate_ph(ph) {
                tracing::warn!(ph, reason, "Discarding out-of-range pH from provider");
                observation.ph = None;
            }
        }

        let fractions: Option<Vec<f64>> = TEXTURE_PROPERTIES
            .iter()
            .map(|p| means.get(*p).copied())
            .collect();
        observation.texture_class = fractions
            .and_then(|f| TextureClass::classify(f[0], f[1], f[2]))
            .map(|class| class.name().to_string());

        observation
    }
}

#[async_trait]
impl SoilDataSource for SoilGridsClient {
    async fn fetch_soil(&self, coordinates: GpsCoordinates) -> AdvisorResult<SoilObservation> {
        let mut query = vec![
            ("lon", coordinates.longitude.to_string()),
            ("lat", coordinates.latitude.to_string()),
        ];
        query.extend(
            PROPERTY_FIELDS
                .iter()
                .map(|(p, _)| *p)
                .chain(TEXTURE_PROPERTIES)
                .map(|p| ("property", p.to_string())),
        );
        query.push(("depth", self.depth.clone()));
        query.push(("value", "mean".to_string()));

        let data: SoilGridsResponse = self.transport.get_json(&self.base_url, &query).await?;
        let observation = self.convert_response(data);
        tracing::debug!(
            missing = ?observation.missing_fields(),
            "Soil observation received"
        );
        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SoilGridsClient {
        let config = SoilConfig {
            api_endpoint: "http://localhost/soilgrids/v2.0/properties/query".to_string(),
            depth: "0-5cm".to_string(),
        };
        SoilGridsClient::new(&config, &HttpConfig::default()).unwrap()
    }

    fn layer(name: &str, d_factor: u32, mean: &str) -> String {
        format!(
            r#"{{"name": "{}", "unit_measure": {{"d_factor": {}}},
                "depths": [
                    {{"label": "0-5cm", "values": {{"mean": {}}}}},
                    {{"label": "5-15cm", "values": {{"mean": 1}}}}
                ]}}"#,
            name, d_factor, mean
        )
    }

    fn response(layers: &[String]) -> SoilGridsResponse {
        let json = format!(r#"{{"properties": {{"layers": [{}]}}}}"#, layers.join(","));
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_d_factor_and_mapping() {
        let data = response(&[
            layer("phh2o", 10, "62"),
            layer("nitrogen", 100, "250"),
            layer("ocd", 10, "455"),
            layer("clay", 10, "320"),
            layer("sand", 10, "400"),
            layer("silt", 10, "280"),
        ]);
        let observation = client().convert_response(data);
        assert_eq!(observation.ph, Some(6.2));
        assert_eq!(observation.nitrogen, Some(2.5));
        assert_eq!(observation.organic_carbon, Some(45.5));
        assert_eq!(observation.phosphorus, None);
        assert_eq!(observation.potassium, None);
        assert_eq!(observation.texture_class.as_deref(), Some("Clay Loam"));
    }

    #[test]
    fn test_null_mean_is_absent() {
        let data = response(&[layer("phh2o", 10, "null"), layer("nitrogen", 100, "120")]);
        let observation = client().convert_response(data);
        assert_eq!(observation.ph, None);
        assert_eq!(observation.nitrogen, Some(1.2));
        assert_eq!(observation.texture_class, None);
    }

    #[test]
    fn test_out_of_range_ph_is_discarded() {
        let data = response(&[layer("phh2o", 1, "62")]);
        assert_eq!(client().convert_response(data).ph, None);
    }
}
