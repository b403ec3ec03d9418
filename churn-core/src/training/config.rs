//! Training configuration
//!
//! Loaded from a YAML, TOML or JSON file (format picked by extension).
//! Every key is optional.

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EXPERIMENT_NAME, DEFAULT_ID_COLUMNS, DEFAULT_RUN_NAME, DEFAULT_TARGET_COLUMN,
};
use crate::error::Result;
use crate::model::ModelParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Directory holding `train.csv`, `val.csv` and `test.csv`
    pub data_dir: PathBuf,
    /// Where the artifact pair and run records are written
    pub model_dir: PathBuf,
    pub model_params: ModelParams,
    pub experiment_name: String,
    pub run_name: String,
    pub target_column: String,
    /// Columns never used as features
    pub id_columns: Vec<String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/processed"),
            model_dir: PathBuf::from("models"),
            model_params: ModelParams::default(),
            experiment_name: DEFAULT_EXPERIMENT_NAME.to_string(),
            run_name: DEFAULT_RUN_NAME.to_string(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            id_columns: DEFAULT_ID_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl TrainingConfig {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn id_columns(&self) -> Vec<&str> {
        self.id_columns.iter().map(String::as_str).collect()
    }
}
