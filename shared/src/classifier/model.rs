//! Fertilizer recommendation model

use serde::{Deserialize, Serialize};

use super::decision_tree::{DecisionTree, TreeArrays};
use super::random_forest::RandomForest;
use crate::codec::{CategoryVocabulary, FeatureVector};
use crate::error::{AdvisorError, AdvisorResult};
use crate::models::FertilizerClass;

/// Serialized classifier as written by the offline training step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainedModel {
    pub version: String,
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<TreeArrays>,
}

impl TrainedModel {
    /// Build the in-memory forest, checking every tree.
    pub fn into_forest(self) -> Result<RandomForest, String> {
        let trees = self
            .trees
            .iter()
            .enumerate()
            .map(|(i, arrays)| {
                DecisionTree::from_arrays(arrays, self.n_features)
                    .map_err(|e| format!("tree {}: {}", i, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        RandomForest::from_trees(trees, self.n_classes)
    }
}

/// Predicted class and its vote share
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub class: FertilizerClass,
    pub confidence: f64,
}

/// Wraps the trained forest and the target vocabulary.
///
/// Either part may be absent when artifacts were not loaded; calls then fail
/// with `ModelNotLoaded` instead of panicking.
#[derive(Debug, Clone, Default)]
pub struct RecommendationModel {
    forest: Option<RandomForest>,
    target: Option<CategoryVocabulary>,
    version: String,
}

impl RecommendationModel {
    /// # Errors
    ///
    /// Returns `Err` if the target vocabulary has fewer labels than the
    /// forest has classes.
    pub fn new(
        forest: RandomForest,
        target: CategoryVocabulary,
        version: impl Into<String>,
    ) -> Result<Self, String> {
        if target.len() < forest.n_classes() {
            return Err(format!(
                "target vocabulary has {} labels for {} classes",
                target.len(),
                forest.n_classes()
            ));
        }
        Ok(Self {
            forest: Some(forest),
            target: Some(target),
            version: version.into(),
        })
    }

    /// A model with no artifacts behind it
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.forest.is_some() && self.target.is_some()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn n_features(&self) -> Option<usize> {
        self.forest.as_ref().map(RandomForest::n_features)
    }

    /// Deterministic for a given vector and artifact.
    pub fn predict(&self, features: &FeatureVector) -> AdvisorResult<Prediction> {
        let forest = self.forest.as_ref().ok_or(AdvisorError::ModelNotLoaded)?;
        if features.len() != forest.n_features() {
            return Err(AdvisorError::FeatureWidthMismatch {
                expected: forest.n_features(),
                actual: features.len(),
            });
        }
        let vote = forest.predict_with_votes(features.as_slice());
        let class = u32::try_from(vote.class).map_err(|_| AdvisorError::ModelNotLoaded)?;
        Ok(Prediction {
            class: FertilizerClass(class),
            confidence: vote.confidence,
        })
    }

    /// Human label for a class, via the target vocabulary
    pub fn decode(&self, class: FertilizerClass) -> AdvisorResult<&str> {
        self.target
            .as_ref()
            .ok_or(AdvisorError::ModelNotLoaded)?
            .decode(class.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class_model() -> TrainedModel {
        TrainedModel {
            version: "run-1".to_string(),
            n_features: 2,
            n_classes: 2,
            trees: vec![TreeArrays {
                feature: vec![1, -2, -2],
                threshold: vec![0.5, -2.0, -2.0],
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                leaf_class: vec![None, Some(0), Some(1)],
            }],
        }
    }

    fn target() -> CategoryVocabulary {
        CategoryVocabulary::from_strs("recommended_fertilizer", &["CAN", "DAP"]).unwrap()
    }

    #[test]
    fn test_predict_and_decode() {
        let forest = two_class_model().into_forest().unwrap();
        let model = RecommendationModel::new(forest, target(), "run-1").unwrap();

        let low = model.predict(&FeatureVector::from(vec![0.0, 0.2])).unwrap();
        let high = model.predict(&FeatureVector::from(vec![0.0, 0.9])).unwrap();
        assert_eq!(model.decode(low.class).unwrap(), "CAN");
        assert_eq!(model.decode(high.class).unwrap(), "DAP");
        assert_eq!(high.confidence, 1.0);
    }

    #[test]
    fn test_unloaded_model() {
        let model = RecommendationModel::unloaded();
        assert!(!model.is_loaded());
        assert_eq!(
            model.predict(&FeatureVector::from(vec![0.0, 0.0])),
            Err(AdvisorError::ModelNotLoaded)
        );
        assert_eq!(
            model.decode(FertilizerClass(0)),
            Err(AdvisorError::ModelNotLoaded)
        );
    }

    #[test]
    fn test_width_mismatch() {
        let forest = two_class_model().into_forest().unwrap();
        let model = RecommendationModel::new(forest, target(), "run-1").unwrap();
        assert_eq!(
            model.predict(&FeatureVector::from(vec![0.0])),
            Err(AdvisorError::FeatureWidthMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_leaf_outside_classes_rejected() {
        let mut model = two_class_model();
        model.trees[0].leaf_class[2] = Some(7);
        let err = model.into_forest().unwrap_err();
        assert!(err.contains("class 7"));
    }

    #[test]
    fn test_target_too_small() {
        let forest = two_class_model().into_forest().unwrap();
        let target = CategoryVocabulary::from_strs("recommended_fertilizer", &["CAN"]).unwrap();
        assert!(RecommendationModel::new(forest, target, "run-1").is_err());
    }
}
