//! Maize Advisor backend
//!
//! Provider clients, the decision pipeline and the command-line front end.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shared::{ArtifactBundle, RainfallAdvisor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod prompt;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use config::LoggingConfig;
use external::{
    CachedResolver, CoordinateResolver, DirectorySource, OpenCageClient, OpenMeteoClient,
    SoilGridsClient,
};
use services::PipelineOrchestrator;

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for results.
pub fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    installed.context("installing tracing subscriber")
}

/// Load artifacts and wire the provider clients into a pipeline
pub fn build_orchestrator(config: &Config) -> AppResult<PipelineOrchestrator> {
    tracing::info!(dir = %config.artifacts.dir.display(), "Loading artifacts...");
    let source = DirectorySource::open(&config.artifacts.dir, config.artifacts.require_manifest)?;
    let bundle = ArtifactBundle::load(&source)?;
    tracing::info!(version = bundle.version(), "Artifacts loaded");

    if config.geocoder.api_key.is_empty() {
        tracing::warn!("geocoder.api_key is empty, location lookups will be rejected");
    }
    let geocoder = OpenCageClient::new(&config.geocoder, &config.http)?;
    let resolver: Arc<dyn CoordinateResolver> = if config.geocoder.cache_ttl_secs > 0 {
        Arc::new(CachedResolver::new(
            geocoder,
            Duration::from_secs(config.geocoder.cache_ttl_secs),
            config.geocoder.cache_capacity,
        ))
    } else {
        Arc::new(geocoder)
    };

    Ok(PipelineOrchestrator::new(
        resolver,
        Arc::new(SoilGridsClient::new(&config.soil, &config.http)?),
        Arc::new(OpenMeteoClient::new(
            &config.rainfall,
            &config.http,
            &config.advisory,
        )?),
        Arc::new(bundle),
        RainfallAdvisor::new(config.advisory.clone()),
    ))
}
