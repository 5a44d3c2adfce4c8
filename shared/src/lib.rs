//! Shared domain logic for the Maize Advisor
//!
//! This crate contains the decision pipeline pieces that do not touch the
//! network: feature encoding, soil validation, the fertilizer classifier and
//! the rainfall planting rules. It is used by the backend CLI and, through
//! WASM, by offline clients.

pub mod advisory;
pub mod artifacts;
pub mod classifier;
pub mod codec;
pub mod error;
pub mod models;
pub mod texture;
pub mod types;
pub mod validation;

pub use advisory::*;
pub use artifacts::{
    ArtifactBundle, ArtifactError, ArtifactManifest, ArtifactSource, InMemorySource, ScalingArtifact,
    VocabularyArtifact,
};
pub use classifier::{Prediction, RecommendationModel, TrainedModel};
pub use codec::*;
pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
