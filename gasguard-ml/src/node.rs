//! Decision tree nodes
//!
//! Trees are stored as a flat `Vec<Node>` with child indices instead of
//! boxed pointers: the root is index 0, and a trained tree serializes as a
//! plain array.

use serde::{Deserialize, Serialize};

/// One node of a classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Internal node: rows with `row[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Leaf with the class distribution of the training rows that reached it
    Leaf { probabilities: Vec<f64> },
}

impl Node {
    /// Leaf from raw class counts
    pub fn leaf(counts: &[usize]) -> Self {
        let total: usize = counts.iter().sum();
        let probabilities = if total == 0 {
            vec![0.0; counts.len()]
        } else {
            counts.iter().map(|&c| c as f64 / total as f64).collect()
        };
        Node::Leaf { probabilities }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Child to visit next, or `None` at a leaf
    pub fn next(&self, row: &[f64]) -> Option<usize> {
        match self {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    Some(*left)
                } else {
                    Some(*right)
                }
            }
            Node::Leaf { .. } => None,
        }
    }
}

/// Gini impurity of a class-count vector
pub fn gini(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}
