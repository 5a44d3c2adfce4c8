//! Random forest inference.
//!
//! Ensemble of [`DecisionTree`]s with majority voting. Trees are trained
//! offline and loaded read-only.

use super::decision_tree::DecisionTree;

/// A random forest classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

/// Result of forest prediction with vote details.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestVote {
    /// Winning class. Ties go to the lowest class id.
    pub class: usize,
    pub votes: Vec<usize>,
    /// Fraction of trees voting for the winning class.
    pub confidence: f64,
}

impl RandomForest {
    /// Build a forest from pre-trained trees.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there are no trees or no classes, if trees disagree
    /// on the feature count, or if a leaf predicts a class outside
    /// `0..n_classes`.
    pub fn from_trees(trees: Vec<DecisionTree>, n_classes: usize) -> Result<Self, String> {
        let Some(first) = trees.first() else {
            return Err("empty forest".into());
        };
        if n_classes == 0 {
            return Err("forest has no classes".into());
        }
        let n_features = first.n_features();
        if trees.iter().any(|t| t.n_features() != n_features) {
            return Err("inconsistent n_features across trees".into());
        }
        for (i, tree) in trees.iter().enumerate() {
            if let Some(class) = tree.max_class().filter(|&c| c >= n_classes) {
                return Err(format!(
                    "tree {} predicts class {} of {}",
                    i, class, n_classes
                ));
            }
        }
        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }

    /// Predict a single sample with vote details.
    pub fn predict_with_votes(&self, features: &[f64]) -> ForestVote {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let pred = tree.predict(features);
            if pred < self.n_classes {
                votes[pred] += 1;
            }
        }

        let mut class = 0;
        for (candidate, &count) in votes.iter().enumerate() {
            if count > votes[class] {
                class = candidate;
            }
        }

        let confidence = votes[class] as f64 / self.trees.len() as f64;

        ForestVote {
            class,
            votes,
            confidence,
        }
    }

    pub fn predict(&self, features: &[f64]) -> usize {
        self.predict_with_votes(features).class
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    pub const fn n_classes(&self) -> usize {
        self.n_classes
    }
}
