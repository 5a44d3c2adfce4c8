//! Configuration management for the Maize Advisor
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MAIZE__ prefix

use std::path::PathBuf;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::AdvisoryRules;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// OpenCage geocoding configuration
    pub geocoder: GeocoderConfig,

    /// SoilGrids configuration
    pub soil: SoilConfig,

    /// Open-Meteo configuration
    pub rainfall: RainfallConfig,

    /// Shared HTTP transport settings
    pub http: HttpConfig,

    /// Trained artifact location
    pub artifacts: ArtifactsConfig,

    /// Planting rule windows and thresholds
    #[serde(default)]
    pub advisory: AdvisoryRules,

    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocoderConfig {
    /// OpenCage API endpoint
    pub api_endpoint: String,

    /// OpenCage API key
    pub api_key: String,

    /// ISO country code results are restricted to
    pub country_code: String,

    /// Seconds a resolved location stays cached, 0 disables the cache
    pub cache_ttl_secs: u64,

    pub cache_capacity: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SoilConfig {
    /// SoilGrids properties endpoint
    pub api_endpoint: String,

    /// Depth interval queried, e.g. 0-5cm
    pub depth: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RainfallConfig {
    /// Open-Meteo forecast endpoint
    pub api_endpoint: String,

    pub timezone: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Delay before the single retry on timeout or connection failure
    pub retry_backoff_ms: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactsConfig {
    /// Directory holding vocab_*.json, scaling.json, model.json
    pub dir: PathBuf,

    /// Fail when manifest.json is absent
    pub require_manifest: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub filter: String,

    /// "pretty" or "json"
    pub format: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("MAIZE__ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("geocoder.api_endpoint", "https://api.opencagedata.com/geocode/v1/json")?
            .set_default("geocoder.api_key", "")?
            .set_default("geocoder.country_code", "ke")?
            .set_default("geocoder.cache_ttl_secs", 600)?
            .set_default("geocoder.cache_capacity", 1000)?
            .set_default("soil.api_endpoint", "https://rest.isric.org/soilgrids/v2.0/properties/query")?
            .set_default("soil.depth", "0-5cm")?
            .set_default("rainfall.api_endpoint", "https://api.open-meteo.com/v1/forecast")?
            .set_default("rainfall.timezone", "Africa/Nairobi")?
            .set_default("http.timeout_secs", 10)?
            .set_default("http.retry_backoff_ms", 500)?
            .set_default("artifacts.dir", "artifacts")?
            .set_default("artifacts.require_manifest", false)?
            .set_default("logging.filter", "maize_advisor=info")?
            .set_default("logging.format", "pretty")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MAIZE__ prefix)
            .add_source(
                Environment::with_prefix("MAIZE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.advisory
            .validate()
            .map_err(|e| ConfigError::Message(format!("advisory: {}", e)))?;
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Message("http.timeout_secs must be positive".into()));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Message(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            retry_backoff_ms: 500,
        }
    }
}
