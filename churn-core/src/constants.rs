//! Central Configuration Constants
//!
//! Single source of truth for defaults shared by training, serving and
//! drift monitoring.

/// Version of the on-disk artifact format.
/// MUST be incremented when the persisted layout of either artifact changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// File name of the persisted model artifact inside `model_dir`
pub const MODEL_FILE_NAME: &str = "churn_model.json";

/// File name of the persisted preprocessor artifact inside `model_dir`
pub const PREPROCESSOR_FILE_NAME: &str = "preprocessor.json";

/// Default target column of the telco dataset
pub const DEFAULT_TARGET_COLUMN: &str = "Churn";

/// Identifier columns that never become features
pub const DEFAULT_ID_COLUMNS: &[&str] = &["customerID"];

/// Default maximum number of customers in one batch request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Probability above which a customer is labelled as churning
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Lower bound (inclusive) of the medium risk band
pub const RISK_MEDIUM_THRESHOLD: f64 = 0.30;

/// Lower bound (inclusive) of the high risk band
pub const RISK_HIGH_THRESHOLD: f64 = 0.60;

/// Default per-column significance for drift tests
pub const DEFAULT_STATTEST_THRESHOLD: f64 = 0.05;

/// Default share of drifted columns that marks the dataset as drifted
pub const DEFAULT_DRIFT_SHARE: f64 = 0.3;

/// Default significance of the aggregate dataset drift test
pub const DEFAULT_DATASET_SIGNIFICANCE: f64 = 0.05;

/// Default upper bound on drifted columns in the drift test suite
pub const DEFAULT_MAX_DRIFTED_COLUMNS: usize = 5;

/// Default experiment name recorded with every trained model
pub const DEFAULT_EXPERIMENT_NAME: &str = "telco_churn";

/// Default run name recorded with every trained model
pub const DEFAULT_RUN_NAME: &str = "churn_model_v1";
