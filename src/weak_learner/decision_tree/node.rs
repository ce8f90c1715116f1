//! A node struct used in the decision tree algorithm.
use serde::{Serialize, Deserialize};

use crate::{
    common::tree::*,
    Sample,
};


/// A node of a decision tree.
/// Every node keeps the class distribution of the training rows
/// that reached it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) enum Node {
    Branch {
        splitter:     Splitter,
        left:         Box<Node>,
        right:        Box<Node>,
        distribution: Vec<f64>,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}


impl Node {
    pub(super) fn branch(
        splitter: Splitter,
        left:     Box<Node>,
        right:    Box<Node>,
        weights:  &[f64],
    ) -> Self
    {
        let distribution = to_distribution(weights);
        Self::Branch { splitter, left, right, distribution, }
    }


    pub(super) fn leaf(weights: &[f64]) -> Self {
        let distribution = to_distribution(weights);
        Self::Leaf { distribution, }
    }


    /// Returns the class distribution of the leaf `row` falls into.
    pub(super) fn proba(&self, sample: &Sample, row: usize) -> &[f64] {
        match self {
            Self::Branch { splitter, left, right, .. } => {
                match splitter.split(sample, row) {
                    LeftRight::Left  => left.proba(sample, row),
                    LeftRight::Right => right.proba(sample, row),
                }
            },
            Self::Leaf { distribution } => &distribution[..],
        }
    }


    /// Returns the number of leaves below this node.
    pub(super) fn n_leaves(&self) -> usize {
        match self {
            Self::Branch { left, right, .. } => {
                left.n_leaves() + right.n_leaves()
            },
            Self::Leaf { .. } => 1,
        }
    }
}


/// Normalizes the class weights.
/// Zero mass yields the uniform distribution.
fn to_distribution(weights: &[f64]) -> Vec<f64> {
    let n_class = weights.len();
    let total = weights.iter().sum::<f64>();
    if total > 0f64 {
        weights.iter().map(|w| w / total).collect()
    } else {
        vec![1f64 / n_class as f64; n_class]
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_distribution() {
        let leaf = Node::leaf(&[1.0, 3.0]);
        let Node::Leaf { distribution } = leaf else {
            panic!("expected a leaf");
        };
        assert_eq!(distribution, vec![0.25, 0.75]);

        let leaf = Node::leaf(&[0.0, 0.0, 0.0, 0.0]);
        let Node::Leaf { distribution } = leaf else {
            panic!("expected a leaf");
        };
        assert_eq!(distribution, vec![0.25; 4]);
    }

    #[test]
    fn test_n_leaves() {
        let left = Box::new(Node::leaf(&[1.0, 0.0]));
        let right = Box::new(Node::leaf(&[0.0, 1.0]));
        let root = Node::branch(
            Splitter::new("x", 0.5), left, right, &[1.0, 1.0]
        );
        assert_eq!(root.n_leaves(), 2);
    }
}
