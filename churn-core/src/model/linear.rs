//! L2-regularised logistic regression fitted by full-batch gradient descent.

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::boosting::sigmoid;
use super::params::LinearParams;

/// Stop once the largest gradient component falls below this.
const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    iterations: usize,
}

impl LogisticRegression {
    /// Minimise `mean log loss + ||w||² / (2·C·n)`; the intercept is not penalised.
    pub fn fit(params: &LinearParams, x: ArrayView2<f64>, y: &[bool]) -> Self {
        let n = x.nrows() as f64;
        let labels: Array1<f64> = y.iter().map(|&label| if label { 1.0 } else { 0.0 }).collect();
        let penalty = 1.0 / (params.c.max(f64::MIN_POSITIVE) * n);

        // Step 1/L, with L bounded through the trace of XᵀX/n
        let mean_sq_norm = x.iter().map(|v| v * v).sum::<f64>() / n;
        let step = 1.0 / (0.25 * (mean_sq_norm + 1.0) + penalty);

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut intercept = 0.0;
        let mut iterations = 0;

        for _ in 0..params.max_iter {
            iterations += 1;

            let probs = (x.dot(&weights) + intercept).mapv(sigmoid);
            let error = &probs - &labels;

            let grad_w = x.t().dot(&error) / n + &weights * penalty;
            let grad_b = error.sum() / n;

            weights.scaled_add(-step, &grad_w);
            intercept -= step * grad_b;

            let largest = grad_w.iter().fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if largest < TOLERANCE {
                break;
            }
        }

        log::debug!("Logistic regression stopped after {} iterations", iterations);

        Self { coefficients: weights.to_vec(), intercept, iterations }
    }

    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Vec<f64> {
        let weights = Array1::from(self.coefficients.clone());
        (x.dot(&weights) + self.intercept).mapv(sigmoid).to_vec()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}
