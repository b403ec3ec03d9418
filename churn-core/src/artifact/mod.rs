//! Artifact Module - Co-versioned Preprocessor/Model Pair
//!
//! A training run persists two files: the fitted preprocessor state and the
//! model. They are only ever loaded together, and a pair that does not come
//! from the same run is rejected before anything is served.

pub mod storage;


use std::path::{Path, PathBuf};

use crate::constants::{MODEL_FILE_NAME, PREPROCESSOR_FILE_NAME};
use crate::error::{ChurnError, Result};
use crate::model::ModelArtifact;
use crate::preprocess::FittedPreprocessorState;

pub use storage::{load_json, save_json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub preprocessor: PathBuf,
}

impl ArtifactPaths {
    pub fn new(model: impl Into<PathBuf>, preprocessor: impl Into<PathBuf>) -> Self {
        Self { model: model.into(), preprocessor: preprocessor.into() }
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(MODEL_FILE_NAME), dir.join(PREPROCESSOR_FILE_NAME))
    }
}

/// A preprocessor state and a model proven to belong to the same training run.
#[derive(Debug, Clone)]
pub struct ArtifactPair {
    state: FittedPreprocessorState,
    model: ModelArtifact,
}

impl ArtifactPair {
    pub fn new(state: FittedPreprocessorState, model: ModelArtifact) -> Result<Self> {
        check_compatible(&state, &model)?;
        Ok(Self { state, model })
    }

    pub fn state(&self) -> &FittedPreprocessorState {
        &self.state
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    pub fn into_parts(self) -> (FittedPreprocessorState, ModelArtifact) {
        (self.state, self.model)
    }

    pub fn save(&self, paths: &ArtifactPaths) -> Result<()> {
        save_json(&self.state, &paths.preprocessor)?;
        save_json(&self.model, &paths.model)?;

        log::info!(
            "Saved artifacts for run {}: {} + {}",
            self.state.run_id(),
            paths.preprocessor.display(),
            paths.model.display()
        );
        Ok(())
    }

    /// Load both files and verify they form one pair.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let state: FittedPreprocessorState = load_json(&paths.preprocessor)?;
        state.validate()?;

        let model: ModelArtifact = load_json(&paths.model)?;
        model.validate()?;

        Self::new(state, model)
    }
}

/// Fail with `ArtifactLoadFailure` unless `model` was trained on `state`.
pub fn check_compatible(state: &FittedPreprocessorState, model: &ModelArtifact) -> Result<()> {
    let meta = model.metadata();

    if meta.format_version != state.format_version() {
        return Err(ChurnError::ArtifactLoadFailure(format!(
            "format versions differ: preprocessor v{}, model v{}",
            state.format_version(),
            meta.format_version
        )));
    }

    if meta.run_id != state.run_id() {
        return Err(ChurnError::ArtifactLoadFailure(format!(
            "model from run {} cannot be paired with preprocessor from run {}",
            meta.run_id,
            state.run_id()
        )));
    }

    if meta.input_width != state.output_width() {
        return Err(ChurnError::ArtifactLoadFailure(format!(
            "model expects {} features but the preprocessor produces {}",
            meta.input_width,
            state.output_width()
        )));
    }

    if meta.layout_hash != state.layout_hash() {
        return Err(ChurnError::ArtifactLoadFailure(format!(
            "feature layout differs: model {:08x}, preprocessor {:08x}",
            meta.layout_hash,
            state.layout_hash()
        )));
    }

    let fingerprint = state.fingerprint()?;
    if meta.preprocessor_fingerprint != fingerprint {
        return Err(ChurnError::ArtifactLoadFailure(
            "preprocessor state differs from the one the model was trained on".into(),
        ));
    }

    Ok(())
}
