//! Fertilizer recommendation output

use serde::{Deserialize, Serialize};

use crate::types::Location;

/// Class id emitted by the classifier, an index into the target vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FertilizerClass(pub u32);

impl std::fmt::Display for FertilizerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fertilizer recommendation for one farm
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub location: Location,
    /// Human label, e.g. "DAP"
    pub fertilizer: String,
    pub class: FertilizerClass,
    /// Fraction of trees that voted for the class
    pub confidence: f64,
    /// Training run the artifacts came from
    pub model_version: String,
}
