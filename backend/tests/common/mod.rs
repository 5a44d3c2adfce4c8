//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use maize_advisor::external::{CoordinateResolver, RainfallDataSource, SoilDataSource};
use maize_advisor::services::PipelineOrchestrator;
use rust_decimal::Decimal;
use shared::artifacts::{vocabulary_file, MODEL_FILE, SCALING_FILE, TARGET_FIELD, TARGET_VOCABULARY_FILE};
use shared::classifier::TreeArrays;
use shared::texture::TextureClass;
use shared::*;

pub const VERSION: &str = "2025-03-run-7";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Every artifact file of a small training run, as JSON bytes.
///
/// The model is one tree on scaled pH: pH <= 6 gives "CAN", above gives "DAP".
pub fn artifact_files() -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    let vocabularies = [
        (CategoricalField::SoilTextureFeel, strings(SOIL_TEXTURE_FEEL_OPTIONS)),
        (CategoricalField::PreviousCrop, strings(PREVIOUS_CROP_OPTIONS)),
        (CategoricalField::FertilizerUsed, strings(FERTILIZER_USED_OPTIONS)),
        (
            CategoricalField::SoilTextureClass,
            TextureClass::ALL.iter().map(|c| c.name().to_string()).collect(),
        ),
    ];
    for (field, categories) in vocabularies {
        let artifact = VocabularyArtifact {
            version: VERSION.to_string(),
            field: field.as_str().to_string(),
            categories,
        };
        files.insert(vocabulary_file(field), serde_json::to_vec(&artifact).unwrap());
    }

    let target = VocabularyArtifact {
        version: VERSION.to_string(),
        field: TARGET_FIELD.to_string(),
        categories: strings(&["CAN", "DAP"]),
    };
    files.insert(TARGET_VOCABULARY_FILE.to_string(), serde_json::to_vec(&target).unwrap());

    let scaling = ScalingArtifact {
        version: VERSION.to_string(),
        fields: NUMERIC_FIELDS
            .iter()
            .map(|f| (f.as_str().to_string(), ScaleTransform::MinMax { min: 0.0, max: 10.0 }))
            .collect(),
    };
    files.insert(SCALING_FILE.to_string(), serde_json::to_vec(&scaling).unwrap());

    let model = TrainedModel {
        version: VERSION.to_string(),
        n_features: FEATURE_WIDTH,
        n_classes: 2,
        trees: vec![TreeArrays {
            feature: vec![5, -2, -2],
            threshold: vec![0.6, -2.0, -2.0],
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            leaf_class: vec![None, Some(0), Some(1)],
        }],
    };
    files.insert(MODEL_FILE.to_string(), serde_json::to_vec(&model).unwrap());
    files
}

pub fn artifact_source() -> InMemorySource {
    let mut source = InMemorySource::new();
    for (name, bytes) in artifact_files() {
        source.insert(name, bytes);
    }
    source
}

pub fn bundle() -> ArtifactBundle {
    ArtifactBundle::load(&artifact_source()).unwrap()
}

pub fn report() -> FarmerReport {
    FarmerReport::new(12.0, "smooth and sticky - forms a ball", "beans", "DAP")
}

/// Complete soil record with the given pH
pub fn soil(ph: f64) -> SoilObservation {
    SoilObservation {
        ph: Some(ph),
        nitrogen: Some(1.2),
        phosphorus: Some(14.0),
        potassium: Some(0.5),
        organic_carbon: Some(2.3),
        texture_class: Some("Clay Loam".to_string()),
    }
}

pub fn kitale() -> GpsCoordinates {
    GpsCoordinates::new(Decimal::new(10157, 4), Decimal::new(350064, 4))
}

/// Fifteen days starting 2025-03-01
pub fn series(amounts: &[i64]) -> RainfallSeries {
    let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let days = amounts
        .iter()
        .enumerate()
        .map(|(i, mm)| DailyRainfall::new(start + chrono::Duration::days(i as i64), Decimal::from(*mm)))
        .collect();
    RainfallSeries::new(days).unwrap()
}

/// Past window of 6 mm a day, forecast of 4 mm a day: ideal conditions
pub fn ideal_series() -> RainfallSeries {
    let mut amounts = vec![6; 5];
    amounts.extend(vec![4; 10]);
    series(&amounts)
}

// ============================================================================
// Fake collaborators
// ============================================================================

/// Resolver backed by a fixed table, counting calls
#[derive(Default)]
pub struct FakeResolver {
    known: HashMap<String, GpsCoordinates>,
    calls: AtomicUsize,
}

impl FakeResolver {
    pub fn with(mut self, location: &str, coordinates: GpsCoordinates) -> Self {
        self.known.insert(location.to_string(), coordinates);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CoordinateResolver for FakeResolver {
    async fn resolve(&self, location_text: &str) -> AdvisorResult<Option<GpsCoordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.known.get(location_text).copied())
    }
}

/// Soil source returning a canned result
pub struct FakeSoil {
    result: AdvisorResult<SoilObservation>,
    pub requested: Mutex<Vec<GpsCoordinates>>,
}

impl FakeSoil {
    pub fn returning(result: AdvisorResult<SoilObservation>) -> Self {
        Self {
            result,
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SoilDataSource for FakeSoil {
    async fn fetch_soil(&self, coordinates: GpsCoordinates) -> AdvisorResult<SoilObservation> {
        self.requested.lock().unwrap().push(coordinates);
        self.result.clone()
    }
}

/// Rainfall source returning a canned result
pub struct FakeRainfall {
    result: AdvisorResult<RainfallSeries>,
}

impl FakeRainfall {
    pub fn returning(result: AdvisorResult<RainfallSeries>) -> Self {
        Self { result }
    }
}

#[async_trait]
impl RainfallDataSource for FakeRainfall {
    async fn fetch_rainfall(&self, _coordinates: GpsCoordinates) -> AdvisorResult<RainfallSeries> {
        self.result.clone()
    }
}

pub fn orchestrator(
    soil: AdvisorResult<SoilObservation>,
    rainfall: AdvisorResult<RainfallSeries>,
) -> PipelineOrchestrator {
    orchestrator_with(
        Arc::new(FakeResolver::default().with("Trans Nzoia, Kiminini", kitale())),
        Arc::new(FakeSoil::returning(soil)),
        rainfall,
    )
}

pub fn orchestrator_with(
    resolver: Arc<dyn CoordinateResolver>,
    soil: Arc<FakeSoil>,
    rainfall: AdvisorResult<RainfallSeries>,
) -> PipelineOrchestrator {
    PipelineOrchestrator::new(
        resolver,
        soil,
        Arc::new(FakeRainfall::returning(rainfall)),
        Arc::new(bundle()),
        RainfallAdvisor::default(),
    )
}
