//! Seeded isolation forest.
//!
//! Each tree is grown on a subsample drawn without replacement by picking a
//! random non-constant feature and a uniform split threshold between the
//! node's min and max, until the node is a singleton, holds identical rows,
//! or reaches `ceil(log2(max_samples))` depth. Points that isolate quickly
//! get short average path lengths and low decision-function values.

use crate::config::ModelConfig;
use crate::error::{Result, ScoringError};
use crate::models::{AnomalyDetector, FittedDetector};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::debug;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Unfitted isolation forest configuration
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_estimators: usize,
    max_samples: usize,
    contamination: f64,
    seed: u64,
    min_samples: usize,
}

impl IsolationForest {
    pub fn new(n_estimators: usize, max_samples: usize, contamination: f64, seed: u64) -> Self {
        Self {
            n_estimators,
            max_samples,
            contamination,
            seed,
            min_samples: 1,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            n_estimators: config.n_estimators,
            max_samples: config.max_samples,
            contamination: config.contamination,
            seed: config.seed,
            min_samples: config.min_samples,
        }
    }

    /// Minimum number of rows accepted by `fit` (never below 1)
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    fn validate(&self, matrix: &[Vec<f64>]) -> Result<usize> {
        if self.n_estimators == 0 {
            return Err(ScoringError::ModelFit("n_estimators must be positive".into()));
        }
        if self.max_samples == 0 {
            return Err(ScoringError::ModelFit("max_samples must be positive".into()));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ScoringError::ModelFit(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }

        let required = self.min_samples.max(1);
        if matrix.len() < required {
            return Err(ScoringError::ModelFit(format!(
                "found {} sample(s) while a minimum of {} is required",
                matrix.len(),
                required
            )));
        }

        let width = matrix[0].len();
        if width == 0 {
            return Err(ScoringError::ModelFit("feature matrix has no columns".into()));
        }
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != width {
                return Err(ScoringError::ModelFit(format!(
                    "row {} has {} features, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(ScoringError::ModelFit(format!(
                    "non-numeric value at row {}, column {}",
                    i, j
                )));
            }
        }
        Ok(width)
    }
}

impl AnomalyDetector for IsolationForest {
    type Fitted = FittedIsolationForest;

    fn fit(&self, matrix: &[Vec<f64>]) -> Result<FittedIsolationForest> {
        let n_features = self.validate(matrix)?;

        let sample_size = self.max_samples.min(matrix.len());
        let max_depth = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let trees: Vec<IsolationTree> = (0..self.n_estimators)
            .map(|_| {
                let sample = index::sample(&mut rng, matrix.len(), sample_size).into_vec();
                IsolationTree::grow(matrix, sample, max_depth, &mut rng)
            })
            .collect();

        let mut forest = FittedIsolationForest {
            trees,
            n_features,
            sample_size,
            offset: 0.0,
        };

        let training_scores = forest.score_samples(matrix);
        forest.offset = percentile(&training_scores, 100.0 * self.contamination);

        debug!(
            trees = self.n_estimators,
            sample_size = sample_size,
            max_depth = max_depth,
            offset = forest.offset,
            "Isolation forest fitted"
        );

        Ok(forest)
    }
}

/// Fitted ensemble of isolation trees
#[derive(Debug, Clone)]
pub struct FittedIsolationForest {
    trees: Vec<IsolationTree>,
    n_features: usize,
    sample_size: usize,
    offset: f64,
}

impl FittedIsolationForest {
    /// Negated isolation score `-2^(-E[h(x)] / c(psi))`, in [-1, 0)
    pub fn score_samples(&self, matrix: &[Vec<f64>]) -> Vec<f64> {
        let normalizer = average_path_length(self.sample_size);
        matrix
            .iter()
            .map(|row| {
                let mean_depth = self
                    .trees
                    .iter()
                    .map(|tree| tree.path_length(row))
                    .sum::<f64>()
                    / self.trees.len() as f64;
                let ratio = if normalizer > 0.0 {
                    mean_depth / normalizer
                } else {
                    1.0
                };
                -(2f64.powf(-ratio))
            })
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl FittedDetector for FittedIsolationForest {
    fn decision_function(&self, matrix: &[Vec<f64>]) -> Vec<f64> {
        self.score_samples(matrix)
            .into_iter()
            .map(|s| s - self.offset)
            .collect()
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Arena-allocated isolation tree; node 0 is the root
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(matrix: &[Vec<f64>], sample: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(matrix, sample, 0, max_depth, rng);
        tree
    }

    fn build(
        &mut self,
        matrix: &[Vec<f64>],
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });

        if depth >= max_depth || rows.len() <= 1 {
            return id;
        }

        // (feature, min, max) for every feature that still varies in this node
        let candidates: Vec<(usize, f64, f64)> = (0..matrix[rows[0]].len())
            .filter_map(|feature| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    let v = matrix[r][feature];
                    (lo.min(v), hi.max(v))
                });
                (lo < hi).then_some((feature, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            return id;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(lo..hi);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| matrix[r][feature] <= threshold);

        let left = self.build(matrix, left_rows, depth + 1, max_depth, rng);
        let right = self.build(matrix, right_rows, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Depth of the leaf reached by `row`, plus the expected remaining
    /// depth for the samples that leaf still holds
    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = 0;
        let mut depth = 0usize;
        loop {
            match &self.nodes[node] {
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { *left } else { *right };
                    depth += 1;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` items
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Percentile with linear interpolation between closest ranks
fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
