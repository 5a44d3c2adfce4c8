//! Offline-trained fertilizer classifier, inference only

mod decision_tree;
mod model;
mod random_forest;

pub use decision_tree::{DecisionTree, TreeArrays, TreeNode};
pub use model::{Prediction, RecommendationModel, TrainedModel};
pub use random_forest::{ForestVote, RandomForest};
