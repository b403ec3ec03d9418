//! Classifier Hyperparameters
//!
//! Selected by the `model_type` tag of the training configuration.

use serde::{Deserialize, Serialize};

/// Hyperparameters for one classifier family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelParams {
    RandomForest(ForestParams),
    GradientBoosting(BoostingParams),
    LogisticRegression(LinearParams),
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams::RandomForest(ForestParams::default())
    }
}

impl ModelParams {
    /// Family tag as written in configuration files.
    pub fn model_type(&self) -> &'static str {
        match self {
            ModelParams::RandomForest(_) => "random_forest",
            ModelParams::GradientBoosting(_) => "gradient_boosting",
            ModelParams::LogisticRegression(_) => "logistic_regression",
        }
    }

    pub fn random_state(&self) -> u64 {
        match self {
            ModelParams::RandomForest(p) => p.random_state,
            ModelParams::GradientBoosting(p) => p.random_state,
            ModelParams::LogisticRegression(p) => p.random_state,
        }
    }
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            random_state: 42,
        }
    }
}

// ============================================================================
// GRADIENT BOOSTING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub random_state: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 5,
            learning_rate: 0.1,
            random_state: 42,
        }
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearParams {
    /// Inverse L2 regularisation strength
    #[serde(rename = "C")]
    pub c: f64,
    pub max_iter: usize,
    pub random_state: u64,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            random_state: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_params_take_defaults() {
        let params: ModelParams =
            serde_json::from_str(r#"{"model_type": "gradient_boosting", "learning_rate": 0.05}"#)
                .unwrap();

        match params {
            ModelParams::GradientBoosting(p) => {
                assert_eq!(p.learning_rate, 0.05);
                assert_eq!(p.n_estimators, 100);
                assert_eq!(p.max_depth, 5);
            }
            other => panic!("unexpected params {:?}", other),
        }
    }

    #[test]
    fn test_logistic_regression_c_key() {
        let params: ModelParams =
            serde_json::from_str(r#"{"model_type": "logistic_regression", "C": 0.5}"#).unwrap();
        assert_eq!(params.model_type(), "logistic_regression");
        assert_eq!(params, ModelParams::LogisticRegression(LinearParams { c: 0.5, ..Default::default() }));
    }

    #[test]
    fn test_default_is_random_forest() {
        let params = ModelParams::default();
        assert_eq!(params.model_type(), "random_forest");
        assert_eq!(params.random_state(), 42);
    }
}
