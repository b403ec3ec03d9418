//! Random forest: bootstrap-sampled CART trees with √p feature subsampling.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::params::ForestParams;
use super::tree::{RegressionTree, TreeConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(params: &ForestParams, x: ArrayView2<f64>, y: &[bool]) -> Self {
        let n_rows = x.nrows();
        let target: Vec<f64> = y.iter().map(|&label| if label { 1.0 } else { 0.0 }).collect();
        let churn_rate = |rows: &[usize]| {
            rows.iter().map(|&r| target[r]).sum::<f64>() / rows.len() as f64
        };

        let config = TreeConfig {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: Some(((x.ncols() as f64).sqrt() as usize).max(1)),
        };

        let mut rng = StdRng::seed_from_u64(params.random_state);
        let trees = (0..params.n_estimators.max(1))
            .map(|_| {
                let sample: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
                RegressionTree::fit(x, &target, &sample, config, &mut rng, &churn_rate)
            })
            .collect();

        Self { trees }
    }

    /// Mean of the leaf churn rates reached in every tree.
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Vec<f64> {
        let n_trees = self.trees.len() as f64;
        x.rows()
            .into_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub(crate) fn max_feature(&self) -> Option<usize> {
        self.trees.iter().filter_map(RegressionTree::max_feature).max()
    }
}
