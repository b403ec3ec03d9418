//! Training Module - End-to-end Training Run
//!
//! Load splits, fit the preprocessor and classifier, evaluate, and persist the
//! artifact pair together with a run record.

pub mod config;
pub mod metrics;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::{save_json, ArtifactPair, ArtifactPaths};
use crate::data::{DataLoader, Dataset};
use crate::error::{ChurnError, Result};
use crate::features::{FeatureSchema, RawRecord};
use crate::model::{ModelArtifact, ModelParams};
use crate::preprocess::Preprocessor;

pub use config::TrainingConfig;
pub use metrics::ClassificationMetrics;

/// Local record of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub experiment_name: String,
    pub run_name: String,
    pub model_version: String,
    pub model_params: ModelParams,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub train_rows: usize,
    pub val_rows: usize,
    pub skipped_rows: usize,
    pub input_width: usize,
    pub train_metrics: ClassificationMetrics,
    pub val_metrics: ClassificationMetrics,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pair: ArtifactPair,
    pub paths: ArtifactPaths,
    pub run_record_path: PathBuf,
    pub record: RunRecord,
}

/// Run the whole training pipeline described by `config`.
pub fn train_model(config: &TrainingConfig) -> Result<TrainingOutcome> {
    let started_at = Utc::now();
    let loader = DataLoader::new(&config.data_dir);

    log::info!("Loading data from {}", config.data_dir.display());
    let train = loader.load_train()?;
    let val = loader.load_val()?;

    let schema = train.infer_schema(&config.target_column, &config.id_columns())?;
    log::info!(
        "Schema: {} numeric, {} categorical columns",
        schema.numeric_columns().count(),
        schema.categorical_columns().count()
    );

    let (train_records, train_labels, train_skipped) = complete_rows(&train, &schema, config)?;
    let (val_records, val_labels, val_skipped) = complete_rows(&val, &schema, config)?;

    if train_records.is_empty() {
        return Err(ChurnError::InsufficientData("no complete training rows".into()));
    }

    let (state, x_train) = Preprocessor::new(schema).fit_transform(&train_records)?;
    let x_val = state.transform(&val_records)?;

    let model = ModelArtifact::fit(&config.model_params, x_train.view(), &train_labels, &state)?
        .with_run(&config.experiment_name, &config.run_name);

    let train_metrics = evaluate(&model, x_train.view(), &train_labels)?;
    let val_metrics = evaluate(&model, x_val.view(), &val_labels)?;

    log::info!(
        "Train: accuracy={:.4} f1={:.4} auc={:.4}",
        train_metrics.accuracy,
        train_metrics.f1,
        train_metrics.roc_auc
    );
    log::info!(
        "Val:   accuracy={:.4} f1={:.4} auc={:.4}",
        val_metrics.accuracy,
        val_metrics.f1,
        val_metrics.roc_auc
    );

    let record = RunRecord {
        run_id: state.run_id(),
        experiment_name: config.experiment_name.clone(),
        run_name: config.run_name.clone(),
        model_version: model.version_tag(),
        model_params: config.model_params.clone(),
        started_at,
        finished_at: Utc::now(),
        train_rows: train_records.len(),
        val_rows: val_records.len(),
        skipped_rows: train_skipped + val_skipped,
        input_width: state.output_width(),
        train_metrics,
        val_metrics,
    };

    let pair = ArtifactPair::new(state, model)?;
    let paths = ArtifactPaths::in_dir(&config.model_dir);
    pair.save(&paths)?;

    let run_record_path = config.model_dir.join(format!("run_{}.json", record.run_id));
    save_json(&record, &run_record_path)?;
    log::info!("Run record written to {}", run_record_path.display());

    Ok(TrainingOutcome { pair, paths, run_record_path, record })
}

/// Evaluate a fitted model on an already transformed matrix.
pub fn evaluate(
    model: &ModelArtifact,
    x: ndarray::ArrayView2<f64>,
    labels: &[bool],
) -> Result<ClassificationMetrics> {
    let probabilities = model.predict_proba(x)?;
    let predictions = model.predict(x)?;
    Ok(ClassificationMetrics::compute(labels, &predictions, &probabilities))
}

/// Split features from labels, dropping rows that miss a feature value.
fn complete_rows(
    dataset: &Dataset,
    schema: &FeatureSchema,
    config: &TrainingConfig,
) -> Result<(Vec<RawRecord>, Vec<bool>, usize)> {
    let (records, labels) = dataset.split_target(&config.target_column)?;

    let mut kept_records = Vec::with_capacity(records.len());
    let mut kept_labels = Vec::with_capacity(labels.len());
    for (record, label) in records.into_iter().zip(labels) {
        if schema.validate_record(&record).is_ok() {
            kept_records.push(record);
            kept_labels.push(label);
        }
    }

    let skipped = dataset.len() - kept_records.len();
    if skipped > 0 {
        log::warn!("Skipped {} rows with missing feature values", skipped);
    }

    Ok((kept_records, kept_labels, skipped))
}
