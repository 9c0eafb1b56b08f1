//! Isolation Forest Scoring
//!
//! Trees are fitted offline and exported node by node. Scoring follows the
//! usual convention: `x[feature] <= threshold` goes left, the path length of
//! a sample is its depth plus the expected remaining depth of the leaf, and
//! the anomaly score is `2^(-mean_path / c(max_samples))`.

use crate::bundle::{Detector, Label};
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};

/// Decision offset used when the artifact does not carry one
pub const DEFAULT_OFFSET: f64 = -0.5;

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Expected path length of an unsuccessful search in a binary tree of `n` samples
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Tree node, children referenced by index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        n_samples: usize,
    },
}

/// One isolation tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    pub nodes: Vec<Node>,
}

impl IsolationTree {
    /// Path length of `x` through this tree
    pub fn path_length(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        let mut depth = 0.0;
        // validate() guarantees children point forward, so this terminates
        loop {
            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
                Node::Leaf { n_samples } => return depth + average_path_length(*n_samples),
            }
        }
    }

    fn validate(&self, tree: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {} has no nodes", tree));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= FEATURE_DIMENSION {
                    return Err(format!("tree {} node {} splits on feature {}", tree, i, feature));
                }
                if threshold.is_nan() {
                    return Err(format!("tree {} node {} has a NaN threshold", tree, i));
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("tree {} node {} has invalid child {}", tree, i, child));
                    }
                }
            }
        }
        Ok(())
    }
}

fn default_offset() -> f64 {
    DEFAULT_OFFSET
}

/// Fitted isolation forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Subsample size each tree was grown on
    pub max_samples: usize,
    /// Decision threshold; a sample is an outlier when `-score - offset < 0`
    #[serde(default = "default_offset")]
    pub offset: f64,
    pub trees: Vec<IsolationTree>,
}

impl IsolationForest {
    /// Structural checks run once at load time
    pub fn validate(&self) -> Result<(), String> {
        if self.max_samples < 2 {
            return Err(format!("max_samples must be at least 2, got {}", self.max_samples));
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if !self.offset.is_finite() {
            return Err("offset must be finite".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }

    /// Anomaly score in (0, 1]; values near 1 are easy to isolate
    pub fn score(&self, x: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(x)).sum();
        let mean_path = total / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.max_samples))
    }

    /// Shifted decision value; negative means outlier
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        -self.score(x) - self.offset
    }
}

impl Detector for IsolationForest {
    fn predict(&self, features: &FeatureVector) -> Label {
        if self.decision_function(features.as_slice()) < 0.0 {
            Label::Anomaly
        } else {
            Label::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// rpm_mean (slot 0) above 2.0 is isolated after one split,
    /// everything else lands in a deep leaf
    fn stump_forest() -> IsolationForest {
        let tree = IsolationTree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 2.0,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { n_samples: 255 },
                Node::Leaf { n_samples: 1 },
            ],
        };
        IsolationForest {
            max_samples: 256,
            offset: DEFAULT_OFFSET,
            trees: vec![tree.clone(), tree],
        }
    }

    fn vector(rpm_mean: f64) -> FeatureVector {
        let mut v = FeatureVector::default();
        v.values[0] = rpm_mean;
        v
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) is about 10.24
        assert!((average_path_length(256) - 10.244).abs() < 1e-2);
    }

    #[test]
    fn test_isolated_sample_is_anomaly() {
        let forest = stump_forest();
        assert!(forest.validate().is_ok());

        // path length 1 → score 2^(-1/10.24) ≈ 0.93
        let outlier = vector(5.0);
        assert!(forest.score(outlier.as_slice()) > 0.9);
        assert_eq!(forest.predict(&outlier), Label::Anomaly);

        // path length 1 + c(255) ≈ 11.2 → score ≈ 0.47
        let inlier = vector(0.0);
        assert!(forest.score(inlier.as_slice()) < 0.5);
        assert_eq!(forest.predict(&inlier), Label::Normal);
    }

    #[test]
    fn test_threshold_boundary_goes_left() {
        let forest = stump_forest();
        assert_eq!(forest.predict(&vector(2.0)), Label::Normal);
    }

    #[test]
    fn test_validation_rejects_bad_structure() {
        let mut forest = stump_forest();
        forest.max_samples = 1;
        assert!(forest.validate().is_err());

        let mut forest = stump_forest();
        forest.trees[0].nodes[0] = Node::Split {
            feature: FEATURE_DIMENSION,
            threshold: 0.0,
            left: 1,
            right: 2,
        };
        assert!(forest.validate().is_err());

        let mut forest = stump_forest();
        forest.trees[1].nodes[0] = Node::Split {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 2,
        };
        assert!(forest.validate().is_err());

        let mut forest = stump_forest();
        forest.trees.clear();
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_node_json_shape() {
        let json = r#"{"max_samples": 4, "trees": [{"nodes": [
            {"type": "split", "feature": 3, "threshold": 0.5, "left": 1, "right": 2},
            {"type": "leaf", "n_samples": 3},
            {"type": "leaf", "n_samples": 1}
        ]}]}"#;
        let forest: IsolationForest = serde_json::from_str(json).unwrap();
        assert_eq!(forest.offset, DEFAULT_OFFSET);
        assert!(forest.validate().is_ok());
        assert!(matches!(forest.trees[0].nodes[0], Node::Split { feature: 3, .. }));
    }
}
