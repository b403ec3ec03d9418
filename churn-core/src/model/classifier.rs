//! Closed set of classifier families behind one fit/predict contract.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use super::boosting::GradientBoosting;
use super::forest::RandomForest;
use super::linear::LogisticRegression;
use super::params::ModelParams;
use crate::constants::DECISION_THRESHOLD;
use crate::error::{ChurnError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classifier {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    LogisticRegression(LogisticRegression),
}

impl Classifier {
    /// Fit the family selected by `params`. Deterministic for a fixed `random_state`.
    pub fn fit(params: &ModelParams, x: ArrayView2<f64>, y: &[bool]) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(ChurnError::ValidationError(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(ChurnError::InsufficientData("cannot fit a classifier on zero rows".into()));
        }
        if x.ncols() == 0 {
            return Err(ChurnError::InsufficientData("cannot fit a classifier on zero features".into()));
        }

        log::info!(
            "Fitting {} on {} rows x {} features",
            params.model_type(),
            x.nrows(),
            x.ncols()
        );

        let classifier = match params {
            ModelParams::RandomForest(p) => Classifier::RandomForest(RandomForest::fit(p, x, y)),
            ModelParams::GradientBoosting(p) => {
                Classifier::GradientBoosting(GradientBoosting::fit(p, x, y))
            }
            ModelParams::LogisticRegression(p) => {
                Classifier::LogisticRegression(LogisticRegression::fit(p, x, y))
            }
        };

        Ok(classifier)
    }

    pub fn model_type(&self) -> &'static str {
        match self {
            Classifier::RandomForest(_) => "random_forest",
            Classifier::GradientBoosting(_) => "gradient_boosting",
            Classifier::LogisticRegression(_) => "logistic_regression",
        }
    }

    /// Churn probability per row, always within [0, 1].
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Vec<f64> {
        let raw = match self {
            Classifier::RandomForest(m) => m.predict_proba(x),
            Classifier::GradientBoosting(m) => m.predict_proba(x),
            Classifier::LogisticRegression(m) => m.predict_proba(x),
        };
        raw.into_iter()
            .map(|p| if p.is_nan() { 0.5 } else { p.clamp(0.0, 1.0) })
            .collect()
    }

    /// Churn label per row: probability strictly above the decision threshold.
    pub fn predict(&self, x: ArrayView2<f64>) -> Vec<bool> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| p > DECISION_THRESHOLD)
            .collect()
    }

    /// Check the fitted parameters can be applied to vectors of `width` features.
    pub(crate) fn check_width(&self, width: usize) -> Result<()> {
        let fits = match self {
            Classifier::LogisticRegression(m) => m.n_features() == width,
            Classifier::RandomForest(m) => m.max_feature().map_or(true, |f| f < width),
            Classifier::GradientBoosting(m) => m.max_feature().map_or(true, |f| f < width),
        };

        if fits {
            Ok(())
        } else {
            Err(ChurnError::ArtifactLoadFailure(format!(
                "{} parameters do not fit {} input features",
                self.model_type(),
                width
            )))
        }
    }
}
