//! OpenCage geocoding client and a short-lived resolution cache
//!
//! Lookups are restricted to one country (Kenya by default). A result whose
//! coordinates fall outside the country is treated as not found.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use shared::{
    is_in_kenya, AdvisorError, AdvisorResult, DataProvider, GpsCoordinates, TransportCause,
};

use super::http::HttpTransport;
use super::CoordinateResolver;
use crate::config::{GeocoderConfig, HttpConfig};
use crate::error::AppResult;

/// OpenCage forward-geocoding client
#[derive(Clone)]
pub struct OpenCageClient {
    transport: HttpTransport,
    api_key: String,
    base_url: String,
    country_code: String,
}

/// OpenCage API response
#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: OpenCageGeometry,
}

#[derive(Debug, Deserialize)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}

impl OpenCageClient {
    pub fn new(config: &GeocoderConfig, http: &HttpConfig) -> AppResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(DataProvider::Geocoder, http)?,
            api_key: config.api_key.clone(),
            base_url: config.api_endpoint.clone(),
            country_code: config.country_code.clone(),
        })
    }

    fn convert_response(&self, data: OpenCageResponse) -> AdvisorResult<Option<GpsCoordinates>> {
        let Some(first) = data.results.into_iter().next() else {
            return Ok(None);
        };
        let OpenCageGeometry { lat, lng } = first.geometry;
        let coordinates = GpsCoordinates::from_f64(lat, lng).ok_or_else(|| {
            AdvisorError::unavailable(
                DataProvider::Geocoder,
                TransportCause::MalformedResponse(format!("non-finite coordinates {}, {}", lat, lng)),
            )
        })?;

        if self.country_code.eq_ignore_ascii_case("ke") && !is_in_kenya(lat, lng) {
            tracing::debug!(lat, lng, "Geocoder result outside Kenya, ignoring");
            return Ok(None);
        }
        Ok(Some(coordinates))
    }
}

#[async_trait]
impl CoordinateResolver for OpenCageClient {
    async fn resolve(&self, location_text: &str) -> AdvisorResult<Option<GpsCoordinates>> {
        let query = [
            ("q", location_text.to_string()),
            ("key", self.api_key.clone()),
            ("countrycode", self.country_code.clone()),
            ("limit", "1".to_string()),
            ("no_annotations", "1".to_string()),
        ];
        let data: OpenCageResponse = self.transport.get_json(&self.base_url, &query).await?;
        self.convert_response(data)
    }
}

/// Caches successful resolutions for a bounded time.
///
/// Not-found answers and failures are never cached.
pub struct CachedResolver<R> {
    inner: R,
    cache: Cache<String, GpsCoordinates>,
}

impl<R: CoordinateResolver> CachedResolver<R> {
    pub fn new(inner: R, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

/// Case and whitespace insensitive cache key
pub fn normalize_location(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[async_trait]
impl<R: CoordinateResolver> CoordinateResolver for CachedResolver<R> {
    async fn resolve(&self, location_text: &str) -> AdvisorResult<Option<GpsCoordinates>> {
        let key = normalize_location(location_text);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(location = %key, "Cache hit for location");
            return Ok(Some(cached));
        }

        let resolved = self.inner.resolve(location_text).await?;
        if let Some(coordinates) = resolved {
            self.cache.insert(key, coordinates).await;
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenCageClient {
        let config = GeocoderConfig {
            api_endpoint: "http://localhost/geocode/v1/json".to_string(),
            api_key: "test".to_string(),
            country_code: "ke".to_string(),
            cache_ttl_secs: 600,
            cache_capacity: 10,
        };
        OpenCageClient::new(&config, &HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_results_is_not_found() {
        let data: OpenCageResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(client().convert_response(data).unwrap(), None);
    }

    #[test]
    fn test_first_result_is_used() {
        let data: OpenCageResponse = serde_json::from_str(
            r#"{"results": [
                {"geometry": {"lat": -0.3031, "lng": 36.08}},
                {"geometry": {"lat": 0.5143, "lng": 35.2698}}
            ]}"#,
        )
        .unwrap();
        let coordinates = client().convert_response(data).unwrap().unwrap();
        assert!(coordinates.latitude < rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn test_result_outside_kenya_is_not_found() {
        let data: OpenCageResponse =
            serde_json::from_str(r#"{"results": [{"geometry": {"lat": 51.5, "lng": -0.12}}]}"#)
                .unwrap();
        assert_eq!(client().convert_response(data).unwrap(), None);
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("  Nakuru,   Bahati "), "nakuru, bahati");
        assert_eq!(normalize_location("NAKURU, Bahati"), normalize_location("nakuru, bahati"));
    }
}
