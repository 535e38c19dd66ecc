//! Binary CART decision-tree classifier.
//!
//! Nodes live in a flat arena with the root at index 0. Leaves store the
//! fraction of positive training rows that reached them, which doubles as the
//! predicted positive-class probability.

mod train;

pub use train::{TreeOptions, train_decision_tree};

use serde::{Deserialize, Serialize};

/// One node of a fitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal node routing `feature <= threshold` left, everything else right.
    Split {
        feature_index: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node.
    Leaf {
        /// Positive-class fraction among training rows in this leaf.
        positive_fraction: f64,
        /// Number of training rows in this leaf.
        samples: usize,
    },
}

/// Fitted decision tree over a fixed-width feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeModel {
    /// Number of `f64` values per feature vector.
    pub feature_len: usize,
    /// Node arena; index 0 is the root.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTreeModel {
    /// True once the tree holds at least a root node.
    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Validate structural invariants of the tree.
    pub fn validate(&self) -> Result<(), String> {
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature_index,
                    left,
                    right,
                    ..
                } => {
                    if *feature_index >= self.feature_len {
                        return Err(format!(
                            "Node {idx} splits on feature {feature_index} but the tree has {} features",
                            self.feature_len
                        ));
                    }
                    // Children always follow their parent, which also rules out cycles.
                    if *left <= idx || *right <= idx {
                        return Err(format!("Node {idx} has a child that does not follow it"));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("Node {idx} references a missing child"));
                    }
                }
                TreeNode::Leaf {
                    positive_fraction, ..
                } => {
                    if !(0.0..=1.0).contains(positive_fraction) {
                        return Err(format!("Leaf {idx} has probability {positive_fraction}"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Positive-class probability for a feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature_index).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf {
                    positive_fraction, ..
                }) => return *positive_fraction,
                None => return 0.0,
            }
        }
    }

    /// Longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes.get(idx) {
                Some(TreeNode::Split { left, right, .. }) => {
                    // Only forward edges; a malformed arena cannot loop here.
                    stack.extend(
                        [*left, *right]
                            .into_iter()
                            .filter(|&child| child > idx)
                            .map(|child| (child, depth + 1)),
                    );
                }
                _ => deepest = deepest.max(depth),
            }
        }
        deepest
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }
}
