//! External API integrations
//!
//! Each provider sits behind a trait so the pipeline can be driven by
//! in-memory fakes in tests.

use async_trait::async_trait;
use shared::{AdvisorResult, GpsCoordinates, RainfallSeries, SoilObservation};

pub mod artifacts;
pub mod geocoding;
pub mod http;
pub mod rainfall;
pub mod soil;

pub use artifacts::DirectorySource;
pub use geocoding::{CachedResolver, OpenCageClient};
pub use http::HttpTransport;
pub use rainfall::OpenMeteoClient;
pub use soil::SoilGridsClient;

/// Free-text place name to coordinates
#[async_trait]
pub trait CoordinateResolver: Send + Sync {
    /// `Ok(None)` when the provider knows no such place
    async fn resolve(&self, location_text: &str) -> AdvisorResult<Option<GpsCoordinates>>;
}

#[async_trait]
pub trait SoilDataSource: Send + Sync {
    /// Topsoil properties at `coordinates`; fields the provider lacks are `None`
    async fn fetch_soil(&self, coordinates: GpsCoordinates) -> AdvisorResult<SoilObservation>;
}

#[async_trait]
pub trait RainfallDataSource: Send + Sync {
    /// Recent and forecast daily rainfall, oldest first
    async fn fetch_rainfall(&self, coordinates: GpsCoordinates) -> AdvisorResult<RainfallSeries>;
}
