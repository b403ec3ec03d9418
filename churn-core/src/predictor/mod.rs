//! Predictor Module - Load Lifecycle & Inference
//!
//! `Unloaded -> Loading -> Ready` on success, `Unloaded -> Loading -> Failed`
//! on any load error. Loading happens once; a failed predictor stays failed
//! until the process restarts. Only a `Ready` predictor serves predictions.

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactPair, ArtifactPaths};
use crate::constants::DECISION_THRESHOLD;
use crate::error::{ChurnError, Result};
use crate::features::RawRecord;
use crate::model::{RiskLevel, RiskThresholds};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorStatus {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for PredictorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PredictorStatus::Unloaded => "unloaded",
            PredictorStatus::Loading => "loading",
            PredictorStatus::Ready => "ready",
            PredictorStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub will_churn: bool,
    /// Within [0, 1].
    pub churn_probability: f64,
    pub risk_level: RiskLevel,
}

enum State {
    Unloaded,
    Loading,
    Ready(Arc<ArtifactPair>),
    Failed(String),
}

impl State {
    fn status(&self) -> PredictorStatus {
        match self {
            State::Unloaded => PredictorStatus::Unloaded,
            State::Loading => PredictorStatus::Loading,
            State::Ready(_) => PredictorStatus::Ready,
            State::Failed(_) => PredictorStatus::Failed,
        }
    }
}

// ============================================================================
// PREDICTOR
// ============================================================================

pub struct Predictor {
    state: RwLock<State>,
    thresholds: RiskThresholds,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::Unloaded),
            thresholds: RiskThresholds::default(),
        }
    }

    /// A predictor that is `Ready` with an already verified pair.
    pub fn from_pair(pair: ArtifactPair) -> Self {
        Self {
            state: RwLock::new(State::Ready(Arc::new(pair))),
            thresholds: RiskThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Load the artifact pair. Only valid from `Unloaded`; never retried.
    pub fn load(&self, paths: &ArtifactPaths) -> Result<()> {
        {
            let mut state = self.state.write();
            if !matches!(*state, State::Unloaded) {
                return Err(ChurnError::ArtifactLoadFailure(format!(
                    "predictor is already {}",
                    state.status()
                )));
            }
            *state = State::Loading;
        }

        log::info!(
            "Loading artifacts: model={} preprocessor={}",
            paths.model.display(),
            paths.preprocessor.display()
        );

        match ArtifactPair::load(paths) {
            Ok(pair) => {
                log::info!(
                    "Predictor ready: {} ({} features)",
                    pair.model().version_tag(),
                    pair.model().input_width()
                );
                *self.state.write() = State::Ready(Arc::new(pair));
                Ok(())
            }
            Err(e) => {
                log::error!("Predictor failed to load: {}", e);
                *self.state.write() = State::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn status(&self) -> PredictorStatus {
        self.state.read().status()
    }

    pub fn is_ready(&self) -> bool {
        self.status() == PredictorStatus::Ready
    }

    pub fn failure_reason(&self) -> Option<String> {
        match &*self.state.read() {
            State::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Version tag of the loaded model, when `Ready`.
    pub fn model_version(&self) -> Option<String> {
        self.loaded().ok().map(|pair| pair.model().version_tag())
    }

    fn loaded(&self) -> Result<Arc<ArtifactPair>> {
        match &*self.state.read() {
            State::Ready(pair) => Ok(Arc::clone(pair)),
            other => Err(ChurnError::ServiceUnavailable(other.status().to_string())),
        }
    }

    /// Transform then score every record.
    ///
    /// Client errors (schema mismatch) pass through; anything else raised
    /// while scoring is reported as `PredictionFailure`.
    pub fn predict_batch(&self, records: &[RawRecord]) -> Result<Vec<PredictionResult>> {
        let pair = self.loaded()?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let x = pair.state().transform(records)?;
        let probabilities = pair.model().predict_proba(x.view()).map_err(|e| {
            log::error!("Scoring failed for {} records: {}", records.len(), e);
            ChurnError::PredictionFailure(e.to_string())
        })?;

        log::debug!("Predicted {} records", records.len());

        Ok(probabilities
            .into_iter()
            .map(|p| PredictionResult {
                will_churn: p > DECISION_THRESHOLD,
                churn_probability: p,
                risk_level: self.thresholds.classify(p),
            })
            .collect())
    }

    /// Equivalent to a batch of one.
    pub fn predict_single(&self, record: &RawRecord) -> Result<PredictionResult> {
        self.predict_batch(std::slice::from_ref(record))?
            .into_iter()
            .next()
            .ok_or_else(|| ChurnError::PredictionFailure("empty prediction batch".into()))
    }
}
