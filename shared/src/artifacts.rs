//! Trained artifacts: vocabularies, scaling parameters and the classifier
//!
//! One training run produces a set of JSON blobs that all carry the same
//! `version`. They are loaded together into an [`ArtifactBundle`] at startup
//! and never mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::{RecommendationModel, TrainedModel};
use crate::codec::{
    CategoricalField, CategoryVocabulary, FeatureCodec, NumericField, ScaleTransform,
    ScalingParameters, CATEGORICAL_FIELDS, FEATURE_WIDTH, NUMERIC_FIELDS,
};

pub const TARGET_VOCABULARY_FILE: &str = "target_vocab.json";
pub const SCALING_FILE: &str = "scaling.json";
pub const MODEL_FILE: &str = "model.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Field name the target vocabulary is stored under
pub const TARGET_FIELD: &str = "recommended_fertilizer";

/// File holding the vocabulary of `field`
pub fn vocabulary_file(field: CategoricalField) -> String {
    format!("vocab_{}.json", field.as_str())
}

/// Every file a complete bundle consists of, manifest excluded
pub fn artifact_files() -> Vec<String> {
    let mut files: Vec<String> = CATEGORICAL_FIELDS.iter().map(|f| vocabulary_file(*f)).collect();
    files.push(TARGET_VOCABULARY_FILE.to_string());
    files.push(SCALING_FILE.to_string());
    files.push(MODEL_FILE.to_string());
    files
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtifactError {
    #[error("Artifact '{0}' is missing")]
    Missing(String),

    #[error("Artifact '{name}' could not be read: {reason}")]
    Unreadable { name: String, reason: String },

    #[error("Artifact '{name}' is malformed: {reason}")]
    Malformed { name: String, reason: String },

    #[error("Artifact '{name}' has version '{found}', expected '{expected}'")]
    VersionMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Artifact '{0}' does not match its recorded checksum")]
    ChecksumMismatch(String),
}

impl ArtifactError {
    pub fn malformed(name: impl Into<String>, reason: impl ToString) -> Self {
        ArtifactError::Malformed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ArtifactError::Missing(_) => "ARTIFACT_MISSING",
            ArtifactError::Unreadable { .. } => "ARTIFACT_UNREADABLE",
            ArtifactError::Malformed { .. } => "ARTIFACT_MALFORMED",
            ArtifactError::VersionMismatch { .. } => "ARTIFACT_VERSION_MISMATCH",
            ArtifactError::ChecksumMismatch(_) => "ARTIFACT_CHECKSUM_MISMATCH",
        }
    }
}

/// Where artifact blobs come from
pub trait ArtifactSource: Send + Sync {
    fn load(&self, name: &str) -> Result<Vec<u8>, ArtifactError>;

    /// Version the source itself vouches for, e.g. from a manifest
    fn declared_version(&self) -> Option<&str> {
        None
    }
}

/// On-disk form of a categorical vocabulary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VocabularyArtifact {
    pub version: String,
    pub field: String,
    pub categories: Vec<String>,
}

/// On-disk form of the numeric scaling parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalingArtifact {
    pub version: String,
    pub fields: BTreeMap<String, ScaleTransform>,
}

/// Checksums recorded by the training run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactManifest {
    pub version: String,
    /// File name to lowercase hex sha256
    pub sha256: BTreeMap<String, String>,
}

/// Artifacts kept in memory, keyed by file name
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: HashMap<String, Vec<u8>>,
    version: Option<String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    pub fn insert_json<T: Serialize>(&mut self, name: impl Into<String>, value: &T) -> Result<(), ArtifactError> {
        let name = name.into();
        let bytes = serde_json::to_vec(value).map_err(|e| ArtifactError::malformed(name.clone(), e))?;
        self.files.insert(name, bytes);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(name)
    }

    pub fn with_declared_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl ArtifactSource for InMemorySource {
    fn load(&self, name: &str) -> Result<Vec<u8>, ArtifactError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| ArtifactError::Missing(name.to_string()))
    }

    fn declared_version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Everything one training run produced, ready for serving
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    codec: FeatureCodec,
    model: RecommendationModel,
    version: String,
}

impl ArtifactBundle {
    pub fn from_parts(codec: FeatureCodec, model: RecommendationModel) -> Self {
        let version = model.version().to_string();
        Self {
            codec,
            model,
            version,
        }
    }

    /// Load and cross-check every artifact. Fails on the first problem.
    pub fn load(source: &dyn ArtifactSource) -> Result<Self, ArtifactError> {
        let trained: TrainedModel = read_json(source, MODEL_FILE)?;
        let version = trained.version.clone();
        if let Some(declared) = source.declared_version() {
            check_version(MANIFEST_FILE, &version, declared)?;
        }
        if trained.n_features != FEATURE_WIDTH {
            return Err(ArtifactError::malformed(
                MODEL_FILE,
                format!("model expects {} features, schema has {}", trained.n_features, FEATURE_WIDTH),
            ));
        }

        let mut codec = FeatureCodec::new();
        for field in CATEGORICAL_FIELDS {
            let name = vocabulary_file(field);
            let vocabulary = load_vocabulary(source, &name, field.as_str(), &version)?;
            codec = codec.with_vocabulary(field, vocabulary);
        }
        codec = codec.with_scaling(load_scaling(source, &version)?);

        let target = load_vocabulary(source, TARGET_VOCABULARY_FILE, TARGET_FIELD, &version)?;
        let forest = trained
            .into_forest()
            .map_err(|reason| ArtifactError::malformed(MODEL_FILE, reason))?;
        let model = RecommendationModel::new(forest, target, version.clone())
            .map_err(|reason| ArtifactError::malformed(TARGET_VOCABULARY_FILE, reason))?;

        Ok(Self {
            codec,
            model,
            version,
        })
    }

    pub fn codec(&self) -> &FeatureCodec {
        &self.codec
    }

    pub fn model(&self) -> &RecommendationModel {
        &self.model
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

fn read_json<T: DeserializeOwned>(source: &dyn ArtifactSource, name: &str) -> Result<T, ArtifactError> {
    let bytes = source.load(name)?;
    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::malformed(name, e))
}

fn check_version(name: &str, expected: &str, found: &str) -> Result<(), ArtifactError> {
    if expected != found {
        return Err(ArtifactError::VersionMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

fn load_vocabulary(
    source: &dyn ArtifactSource,
    name: &str,
    field: &str,
    version: &str,
) -> Result<CategoryVocabulary, ArtifactError> {
    let artifact: VocabularyArtifact = read_json(source, name)?;
    check_version(name, version, &artifact.version)?;
    if artifact.field != field {
        return Err(ArtifactError::malformed(
            name,
            format!("holds field '{}', expected '{}'", artifact.field, field),
        ));
    }
    CategoryVocabulary::new(artifact.field, artifact.categories).map_err(|reason| ArtifactError::malformed(name, reason))
}

fn load_scaling(source: &dyn ArtifactSource, version: &str) -> Result<ScalingParameters, ArtifactError> {
    let artifact: ScalingArtifact = read_json(source, SCALING_FILE)?;
    check_version(SCALING_FILE, version, &artifact.version)?;

    let mut scaling = ScalingParameters::new();
    for (name, transform) in artifact.fields {
        let field = NumericField::from_name(&name)
            .ok_or_else(|| ArtifactError::malformed(SCALING_FILE, format!("unknown field '{}'", name)))?;
        if !transform.is_finite() {
            return Err(ArtifactError::malformed(
                SCALING_FILE,
                format!("non-finite parameters for '{}'", name),
            ));
        }
        scaling.insert(field, transform);
    }
    if let Some(missing) = NUMERIC_FIELDS.iter().find(|f| scaling.get(**f).is_none()) {
        return Err(ArtifactError::malformed(
            SCALING_FILE,
            format!("no parameters for '{}'", missing.as_str()),
        ));
    }
    Ok(scaling)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_complete_bundle() {
        let bundle = ArtifactBundle::load(&fixtures::source()).unwrap();
        assert_eq!(bundle.version(), fixtures::VERSION);
        assert!(bundle.model().is_loaded());
        assert_eq!(bundle.model().n_features(), Some(FEATURE_WIDTH));
        assert_eq!(
            bundle
                .codec()
                .encode_categorical("Urea", CategoricalField::FertilizerUsed)
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_version_mismatch_fails() {
        let mut source = fixtures::source();
        source
            .insert_json(
                TARGET_VOCABULARY_FILE,
                &VocabularyArtifact {
                    version: "older-run".to_string(),
                    field: TARGET_FIELD.to_string(),
                    categories: vec!["CAN".to_string(), "DAP".to_string()],
                },
            )
            .unwrap();
        let err = ArtifactBundle::load(&source).unwrap_err();
        assert!(matches!(err, ArtifactError::VersionMismatch { ref name, .. } if name == TARGET_VOCABULARY_FILE));
    }

    #[test]
    fn test_declared_version_must_match() {
        let source = fixtures::source().with_declared_version("other");
        let err = ArtifactBundle::load(&source).unwrap_err();
        assert!(matches!(err, ArtifactError::VersionMismatch { .. }));
    }

    #[test]
    fn test_missing_file() {
        let mut source = fixtures::source();
        source.remove(SCALING_FILE);
        assert_eq!(
            ArtifactBundle::load(&source).unwrap_err(),
            ArtifactError::Missing(SCALING_FILE.to_string())
        );
    }

    #[test]
    fn test_malformed_json() {
        let mut source = fixtures::source();
        source.insert(MODEL_FILE, b"{not json".to_vec());
        assert!(matches!(
            ArtifactBundle::load(&source).unwrap_err(),
            ArtifactError::Malformed { .. }
        ));
    }

    #[test]
    fn test_model_leaf_outside_classes_rejected() {
        let mut source = fixtures::source();
        let model = TrainedModel {
            version: fixtures::VERSION.to_string(),
            n_features: FEATURE_WIDTH,
            n_classes: 2,
            trees: vec![crate::classifier::TreeArrays {
                feature: vec![-2],
                threshold: vec![-2.0],
                children_left: vec![-1],
                children_right: vec![-1],
                leaf_class: vec![Some(7)],
            }],
        };
        source.insert_json(MODEL_FILE, &model).unwrap();
        assert!(matches!(
            ArtifactBundle::load(&source).unwrap_err(),
            ArtifactError::Malformed { ref name, .. } if name == MODEL_FILE
        ));
    }

    #[test]
    fn test_duplicate_vocabulary_entry_rejected() {
        let mut source = fixtures::source();
        source
            .insert_json(
                vocabulary_file(CategoricalField::PreviousCrop),
                &VocabularyArtifact {
                    version: fixtures::VERSION.to_string(),
                    field: "previous_crop".to_string(),
                    categories: vec!["maize".to_string(), "maize".to_string()],
                },
            )
            .unwrap();
        assert!(matches!(
            ArtifactBundle::load(&source).unwrap_err(),
            ArtifactError::Malformed { .. }
        ));
    }

    #[test]
    fn test_artifact_files_listing() {
        let files = artifact_files();
        assert_eq!(files.len(), CATEGORICAL_FIELDS.len() + 3);
        assert!(files.contains(&"vocab_soil_texture_feel.json".to_string()));
        assert!(!files.contains(&MANIFEST_FILE.to_string()));
    }
}
