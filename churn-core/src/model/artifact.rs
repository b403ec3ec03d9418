//! Trained model artifact: classifier parameters plus the metadata that ties
//! them to exactly one fitted preprocessor.

use chrono::{DateTime, Utc};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classifier::Classifier;
use super::params::ModelParams;
use crate::constants::{ARTIFACT_FORMAT_VERSION, DEFAULT_EXPERIMENT_NAME, DEFAULT_RUN_NAME};
use crate::error::{ChurnError, Result};
use crate::preprocess::FittedPreprocessorState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub format_version: u32,
    /// Training run shared with the preprocessor artifact.
    pub run_id: Uuid,
    pub model_type: String,
    pub params: ModelParams,
    pub trained_at: DateTime<Utc>,
    pub experiment_name: String,
    pub run_name: String,
    pub input_width: usize,
    /// Layout hash of the preprocessor output this model was trained on.
    pub layout_hash: u32,
    /// SHA-256 of the preprocessor state this model was trained on.
    pub preprocessor_fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    metadata: ModelMetadata,
    classifier: Classifier,
}

impl ModelArtifact {
    /// Fit a classifier on the output of `state` and bind it to that state.
    pub fn fit(
        params: &ModelParams,
        x: ArrayView2<f64>,
        y: &[bool],
        state: &FittedPreprocessorState,
    ) -> Result<Self> {
        if x.ncols() != state.output_width() {
            return Err(ChurnError::SchemaMismatch(format!(
                "training matrix has {} columns but the preprocessor produces {}",
                x.ncols(),
                state.output_width()
            )));
        }

        let classifier = Classifier::fit(params, x, y)?;

        let metadata = ModelMetadata {
            format_version: ARTIFACT_FORMAT_VERSION,
            run_id: state.run_id(),
            model_type: classifier.model_type().to_string(),
            params: params.clone(),
            trained_at: Utc::now(),
            experiment_name: DEFAULT_EXPERIMENT_NAME.to_string(),
            run_name: DEFAULT_RUN_NAME.to_string(),
            input_width: state.output_width(),
            layout_hash: state.layout_hash(),
            preprocessor_fingerprint: state.fingerprint()?,
        };

        Ok(Self { metadata, classifier })
    }

    /// Record the experiment and run this model belongs to.
    pub fn with_run(mut self, experiment_name: impl Into<String>, run_name: impl Into<String>) -> Self {
        self.metadata.experiment_name = experiment_name.into();
        self.metadata.run_name = run_name.into();
        self
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn input_width(&self) -> usize {
        self.metadata.input_width
    }

    /// `<run_name>-<first 8 chars of run_id>`
    pub fn version_tag(&self) -> String {
        let run_id = self.metadata.run_id.simple().to_string();
        format!("{}-{}", self.metadata.run_name, &run_id[..8])
    }

    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Vec<f64>> {
        self.check_input(x)?;
        Ok(self.classifier.predict_proba(x))
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<bool>> {
        self.check_input(x)?;
        Ok(self.classifier.predict(x))
    }

    fn check_input(&self, x: ArrayView2<f64>) -> Result<()> {
        if x.ncols() == self.metadata.input_width {
            Ok(())
        } else {
            Err(ChurnError::SchemaMismatch(format!(
                "model expects {} features, got {}",
                self.metadata.input_width,
                x.ncols()
            )))
        }
    }

    /// Structural checks run after restoring a persisted model.
    pub fn validate(&self) -> Result<()> {
        if self.metadata.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ChurnError::ArtifactLoadFailure(format!(
                "unsupported model format v{} (expected v{})",
                self.metadata.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        if self.metadata.model_type != self.classifier.model_type() {
            return Err(ChurnError::ArtifactLoadFailure(format!(
                "model declares '{}' but holds '{}' parameters",
                self.metadata.model_type,
                self.classifier.model_type()
            )));
        }

        self.classifier.check_width(self.metadata.input_width)
    }
}
