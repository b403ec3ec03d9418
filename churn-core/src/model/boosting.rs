//! Gradient boosting for binary log loss.
//!
//! 1. Start from the log-odds of the churn rate
//! 2. Each round fits a regression tree to the residuals `y - p`
//! 3. Leaves hold the Newton step `Σ(y - p) / Σ p(1 - p)`
//! 4. Probability is the sigmoid of the shrunken additive score

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::params::BoostingParams;
use super::tree::{RegressionTree, TreeConfig};

/// Clamp for the initial log-odds when a class is absent from training.
const MAX_LOG_ODDS: f64 = 5.0;

/// Floor on the hessian sum so a pure leaf gets a bounded step.
const MIN_HESSIAN: f64 = 1e-12;

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    learning_rate: f64,
    init_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn fit(params: &BoostingParams, x: ArrayView2<f64>, y: &[bool]) -> Self {
        let n_rows = x.nrows();
        let labels: Vec<f64> = y.iter().map(|&label| if label { 1.0 } else { 0.0 }).collect();
        let rows: Vec<usize> = (0..n_rows).collect();

        let rate = labels.iter().sum::<f64>() / n_rows as f64;
        let init_score = if rate > 0.0 && rate < 1.0 {
            (rate / (1.0 - rate)).ln()
        } else if rate >= 1.0 {
            MAX_LOG_ODDS
        } else {
            -MAX_LOG_ODDS
        };

        let config = TreeConfig {
            max_depth: params.max_depth,
            min_samples_split: 2,
            max_features: None,
        };

        let mut rng = StdRng::seed_from_u64(params.random_state);
        let mut scores = vec![init_score; n_rows];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let probs: Vec<f64> = scores.iter().map(|&s| sigmoid(s)).collect();
            let residuals: Vec<f64> = labels.iter().zip(&probs).map(|(y, p)| y - p).collect();

            let newton_step = |rows: &[usize]| {
                let gradient: f64 = rows.iter().map(|&r| residuals[r]).sum();
                let hessian: f64 = rows.iter().map(|&r| probs[r] * (1.0 - probs[r])).sum();
                gradient / hessian.max(MIN_HESSIAN)
            };

            let tree = RegressionTree::fit(x, &residuals, &rows, config, &mut rng, &newton_step);
            for (score, row) in scores.iter_mut().zip(x.rows()) {
                *score += params.learning_rate * tree.predict_row(row);
            }
            trees.push(tree);
        }

        Self { learning_rate: params.learning_rate, init_score, trees }
    }

    pub fn decision_function(&self, x: ArrayView2<f64>) -> Vec<f64> {
        x.rows()
            .into_iter()
            .map(|row| {
                self.init_score
                    + self
                        .trees
                        .iter()
                        .map(|t| self.learning_rate * t.predict_row(row))
                        .sum::<f64>()
            })
            .collect()
    }

    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Vec<f64> {
        self.decision_function(x).into_iter().map(sigmoid).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub(crate) fn max_feature(&self) -> Option<usize> {
        self.trees.iter().filter_map(RegressionTree::max_feature).max()
    }
}
