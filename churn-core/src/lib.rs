//! Churn Core - Telco Customer Churn Scoring
//!
//! Training pipeline (`data` -> `preprocess` -> `model` -> `artifact`),
//! the serving-side `Predictor`, and the offline `DriftMonitor`.

pub mod artifact;
pub mod constants;
pub mod data;
pub mod drift;
pub mod error;
pub mod features;
pub mod model;
pub mod predictor;
pub mod preprocess;
pub mod training;

#[cfg(test)]
mod test_support;

pub use artifact::{ArtifactPair, ArtifactPaths};
pub use data::{DataLoader, Dataset};
pub use drift::{DriftConfig, DriftMonitor, DriftReport};
pub use error::{ChurnError, Result};
pub use features::{ColumnKind, FeatureSchema, RawRecord, RawValue};
pub use model::{ModelArtifact, ModelParams, RiskLevel, RiskThresholds};
pub use predictor::{PredictionResult, Predictor, PredictorStatus};
pub use preprocess::{FittedPreprocessorState, Preprocessor};
pub use training::{train_model, TrainingConfig};
