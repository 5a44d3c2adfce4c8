//! Decision tree inference.
//!
//! Array-based tree representation mirroring sklearn's exported structure.
//! Trees are trained offline; this module only walks them.

use serde::{Deserialize, Serialize};

/// Marker sklearn uses for "no feature" on leaves
const LEAF_FEATURE: i32 = -2;

/// A node in the decision tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Feature index to split on (negative for leaf nodes).
    pub feature: i32,
    /// Split threshold (features <= threshold go left).
    pub threshold: f64,
    pub left_child: i32,
    pub right_child: i32,
    /// Predicted class for leaf nodes.
    pub prediction: Option<usize>,
}

impl TreeNode {
    pub const fn is_leaf(&self) -> bool {
        self.feature < 0
    }
}

/// Parallel arrays as exported from a fitted sklearn tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeArrays {
    pub feature: Vec<i32>,
    pub threshold: Vec<f64>,
    pub children_left: Vec<i32>,
    pub children_right: Vec<i32>,
    /// Majority class at each node; only read on leaves
    pub leaf_class: Vec<Option<usize>>,
}

/// A decision tree classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
}

impl DecisionTree {
    /// Build a tree from exported arrays.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the arrays disagree in length, a split refers to a
    /// feature outside `n_features`, a child pointer does not point forward
    /// to an existing node, or a leaf carries no class. A tree that passes
    /// these checks always terminates.
    pub fn from_arrays(arrays: &TreeArrays, n_features: usize) -> Result<Self, String> {
        let n = arrays.feature.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if arrays.threshold.len() != n
            || arrays.children_left.len() != n
            || arrays.children_right.len() != n
            || arrays.leaf_class.len() != n
        {
            return Err("inconsistent array lengths".into());
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let node = TreeNode {
                feature: arrays.feature[i],
                threshold: arrays.threshold[i],
                left_child: arrays.children_left[i],
                right_child: arrays.children_right[i],
                prediction: arrays.leaf_class[i],
            };
            if node.is_leaf() {
                if node.prediction.is_none() {
                    return Err(format!("leaf {} has no class", i));
                }
            } else {
                if node.feature as usize >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        i, node.feature, n_features
                    ));
                }
                for child in [node.left_child, node.right_child] {
                    if child <= i as i32 || child as usize >= n {
                        return Err(format!("node {} has invalid child {}", i, child));
                    }
                }
            }
            nodes.push(node);
        }

        Ok(Self { nodes, n_features })
    }

    /// A single-leaf tree, used by tests and fixtures
    pub fn constant(class: usize, n_features: usize) -> Self {
        Self {
            nodes: vec![TreeNode {
                feature: LEAF_FEATURE,
                threshold: LEAF_FEATURE as f64,
                left_child: -1,
                right_child: -1,
                prediction: Some(class),
            }],
            n_features,
        }
    }

    /// Classify a single sample by walking from the root to a leaf.
    #[allow(clippy::cast_sign_loss)]
    pub fn predict(&self, features: &[f64]) -> usize {
        let mut idx = 0usize;
        while let Some(node) = self.nodes.get(idx) {
            if node.is_leaf() {
                return node.prediction.unwrap_or(0);
            }
            let value = features.get(node.feature as usize).copied().unwrap_or(0.0);
            idx = if value <= node.threshold {
                node.left_child as usize
            } else {
                node.right_child as usize
            };
        }
        0
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Highest class any leaf predicts
    pub fn max_class(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .filter_map(|n| n.prediction)
            .max()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub const fn n_features(&self) -> usize {
        self.n_features
    }
}
