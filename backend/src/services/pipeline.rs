//! Decision pipeline orchestration
//!
//! Wires the resolver, soil and rainfall sources, the feature codec, the
//! classifier and the rainfall advisor. Every stage failure short-circuits and
//! is returned as-is.

use std::sync::Arc;

use serde::Serialize;
use shared::{
    validate_farmer_report, validate_location_text, validate_soil, AdvisorError, AdvisorResult,
    Advisory, ArtifactBundle, FarmerReport, Location, RainfallAdvisor, Recommendation,
    SoilObservation,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::external::{CoordinateResolver, RainfallDataSource, SoilDataSource};

/// Planting advice for a resolved location
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlantingAdvice {
    pub location: Location,
    pub advisory: Advisory,
}

/// Both branches of a consultation. Each branch fails independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Consultation {
    pub location: Location,
    pub recommendation: AdvisorResult<Recommendation>,
    pub advisory: AdvisorResult<Advisory>,
}

/// Runs the recommendation and advisory pipelines
#[derive(Clone)]
pub struct PipelineOrchestrator {
    resolver: Arc<dyn CoordinateResolver>,
    soil: Arc<dyn SoilDataSource>,
    rainfall: Arc<dyn RainfallDataSource>,
    artifacts: Arc<ArtifactBundle>,
    advisor: RainfallAdvisor,
}

impl PipelineOrchestrator {
    pub fn new(
        resolver: Arc<dyn CoordinateResolver>,
        soil: Arc<dyn SoilDataSource>,
        rainfall: Arc<dyn RainfallDataSource>,
        artifacts: Arc<ArtifactBundle>,
        advisor: RainfallAdvisor,
    ) -> Self {
        Self {
            resolver,
            soil,
            rainfall,
            artifacts,
            advisor,
        }
    }

    pub fn artifacts(&self) -> &ArtifactBundle {
        &self.artifacts
    }

    pub fn advisor(&self) -> &RainfallAdvisor {
        &self.advisor
    }

    /// Fertilizer recommendation for `location_text`
    pub async fn recommend(
        &self,
        report: &FarmerReport,
        location_text: &str,
    ) -> AdvisorResult<Recommendation> {
        let span = tracing::info_span!("recommend", request_id = %Uuid::new_v4());
        async {
            validate_farmer_report(report)?;
            let location = self.resolve(location_text).await?;
            let soil = self.soil.fetch_soil(location.coordinates).await?;
            self.recommend_from_soil(report, location, &soil)
        }
        .instrument(span)
        .await
    }

    /// Planting-timing advice for `location_text`
    pub async fn advise(&self, location_text: &str) -> AdvisorResult<PlantingAdvice> {
        let span = tracing::info_span!("advise", request_id = %Uuid::new_v4());
        async {
            let location = self.resolve(location_text).await?;
            let series = self.rainfall.fetch_rainfall(location.coordinates).await?;
            let advisory = self.advisor.evaluate(&series)?;
            log_advisory(&advisory);
            Ok(PlantingAdvice { location, advisory })
        }
        .instrument(span)
        .await
    }

    /// Recommendation and advisory for one location.
    ///
    /// The location is resolved once; soil and rainfall are then fetched
    /// concurrently and a failure in one branch does not affect the other.
    pub async fn consult(
        &self,
        report: &FarmerReport,
        location_text: &str,
    ) -> AdvisorResult<Consultation> {
        let span = tracing::info_span!("consult", request_id = %Uuid::new_v4());
        async {
            let location = self.resolve(location_text).await?;
            let coordinates = location.coordinates;

            let soil_branch = async {
                validate_farmer_report(report)?;
                self.soil.fetch_soil(coordinates).await
            };
            let rainfall_branch = self.rainfall.fetch_rainfall(coordinates);
            let (soil, rainfall) = tokio::join!(soil_branch, rainfall_branch);

            let recommendation =
                soil.and_then(|soil| self.recommend_from_soil(report, location.clone(), &soil));
            let advisory = rainfall.and_then(|series| self.advisor.evaluate(&series));

            if let Err(e) = &recommendation {
                tracing::warn!(code = e.code(), "Recommendation branch failed");
            }
            match &advisory {
                Ok(advisory) => log_advisory(advisory),
                Err(e) => tracing::warn!(code = e.code(), "Advisory branch failed"),
            }

            Ok(Consultation {
                location,
                recommendation,
                advisory,
            })
        }
        .instrument(span)
        .await
    }

    async fn resolve(&self, location_text: &str) -> AdvisorResult<Location> {
        let text = location_text.trim();
        validate_location_text(text).map_err(|reason| AdvisorError::InvalidInput {
            field: "location".to_string(),
            reason: reason.to_string(),
        })?;

        let coordinates = self
            .resolver
            .resolve(text)
            .await?
            .ok_or_else(|| AdvisorError::LocationNotFound(text.to_string()))?;
        tracing::info!(
            latitude = %coordinates.latitude,
            longitude = %coordinates.longitude,
            "Location resolved"
        );
        Ok(Location::new(text, coordinates))
    }

    fn recommend_from_soil(
        &self,
        report: &FarmerReport,
        location: Location,
        soil: &SoilObservation,
    ) -> AdvisorResult<Recommendation> {
        let validated = validate_soil(soil)?;
        let observation = validated.into_observation();

        let codec = self.artifacts.codec();
        let model = self.artifacts.model();
        let features = codec.build_feature_vector(report, &observation)?;
        let prediction = model.predict(&features)?;
        let fertilizer = model.decode(prediction.class)?.to_string();

        tracing::info!(
            fertilizer = %fertilizer,
            confidence = prediction.confidence,
            model_version = model.version(),
            "Fertilizer recommended"
        );

        Ok(Recommendation {
            location,
            fertilizer,
            class: prediction.class,
            confidence: prediction.confidence,
            model_version: model.version().to_string(),
        })
    }
}

fn log_advisory(advisory: &Advisory) {
    tracing::info!(
        verdict = ?advisory.verdict,
        rule = %advisory.rule,
        past_rain = %advisory.metrics.past_rain,
        recent_rain = %advisory.metrics.recent_rain,
        forecast_rain = %advisory.metrics.forecast_rain,
        "Planting advisory issued"
    );
}
