//! Drift Monitor Module - Reference vs Current Distribution Shift
//!
//! How it works:
//! 1. Each feature column is compared between the reference set (usually the
//!    training split) and the current set: KS test for numeric columns,
//!    chi-square homogeneity for categorical ones
//! 2. A column drifts when its p-value is below `stattest_threshold`
//! 3. The dataset drifts when the drifted share exceeds `drift_share` or a
//!    binomial test on the drifted-column count is below `dataset_significance`
//!
//! Shares no state with serving; it only reads the datasets it is given.

pub mod checks;
pub mod report;
pub mod stats;


use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DATASET_SIGNIFICANCE, DEFAULT_DRIFT_SHARE, DEFAULT_ID_COLUMNS,
    DEFAULT_MAX_DRIFTED_COLUMNS, DEFAULT_STATTEST_THRESHOLD, DEFAULT_TARGET_COLUMN,
};
use crate::error::{ChurnError, Result};
use crate::features::{ColumnKind, FeatureSchema, RawRecord};

pub use checks::{run_checks, CheckResult, TestSuiteResult};
pub use report::{monitor_production_data, save_report, DriftSummary, ReportFiles};
pub use stats::TestResult;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Per-column significance
    pub stattest_threshold: f64,
    /// Share of drifted columns above which the dataset drifts
    pub drift_share: f64,
    /// Significance of the combined dataset test
    pub dataset_significance: f64,
    /// Upper bound (exclusive) on drifted columns in the test suite
    pub max_drifted_columns: usize,
    pub target_column: String,
    pub id_columns: Vec<String>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            stattest_threshold: DEFAULT_STATTEST_THRESHOLD,
            drift_share: DEFAULT_DRIFT_SHARE,
            dataset_significance: DEFAULT_DATASET_SIGNIFICANCE,
            max_drifted_columns: DEFAULT_MAX_DRIFTED_COLUMNS,
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            id_columns: DEFAULT_ID_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

// ============================================================================
// REPORT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTest {
    KolmogorovSmirnov,
    ChiSquare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub column: String,
    pub kind: ColumnKind,
    pub stattest: StatTest,
    pub statistic: f64,
    /// Drift score: the test's p-value. Lower means stronger evidence of drift.
    pub p_value: f64,
    pub drifted: bool,
    pub reference_count: usize,
    pub current_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: DateTime<Utc>,
    pub reference_rows: usize,
    pub current_rows: usize,
    pub number_of_columns: usize,
    pub number_of_drifted_columns: usize,
    pub share_of_drifted_columns: f64,
    pub dataset_drift: bool,
    /// Binomial test on the number of drifted columns
    pub dataset_test: TestResult,
    /// Names of drifted columns, in schema order
    pub drifted_columns: Vec<String>,
    pub columns: Vec<ColumnDrift>,
    pub stattest_threshold: f64,
    pub drift_share: f64,
}

impl DriftReport {
    pub fn column(&self, name: &str) -> Option<&ColumnDrift> {
        self.columns.iter().find(|c| c.column == name)
    }
}

/// Alert when the drifted share exceeds `threshold` or the dataset drifted.
pub fn check_alert(report: &DriftReport, threshold: f64) -> bool {
    report.share_of_drifted_columns > threshold || report.dataset_drift
}

// ============================================================================
// COMPARISON
// ============================================================================

/// Compare `current` against `reference` column by column.
pub fn compare(
    reference: &[RawRecord],
    current: &[RawRecord],
    schema: &FeatureSchema,
    config: &DriftConfig,
) -> Result<DriftReport> {
    if reference.is_empty() {
        return Err(ChurnError::InsufficientData("reference dataset is empty".into()));
    }
    if current.is_empty() {
        return Err(ChurnError::InsufficientData("current dataset is empty".into()));
    }

    let mut columns = Vec::with_capacity(schema.len());
    for spec in schema.columns() {
        let (stattest, result, reference_count, current_count) = match spec.kind {
            ColumnKind::Numeric => {
                let a = numeric_values(reference, &spec.name)?;
                let b = numeric_values(current, &spec.name)?;
                (StatTest::KolmogorovSmirnov, stats::ks_two_sample(&a, &b), a.len(), b.len())
            }
            ColumnKind::Categorical => {
                let a = category_counts(reference, &spec.name);
                let b = category_counts(current, &spec.name);
                let result = stats::chi_square_homogeneity(&a, &b);
                (StatTest::ChiSquare, result, a.values().sum(), b.values().sum())
            }
        };

        // An empty side would otherwise read as "no difference"
        for (side, count) in [("reference", reference_count), ("current", current_count)] {
            if count == 0 {
                return Err(ChurnError::SchemaMismatch(format!(
                    "column '{}' has no values in the {} dataset",
                    spec.name, side
                )));
            }
        }

        columns.push(ColumnDrift {
            column: spec.name.clone(),
            kind: spec.kind,
            stattest,
            statistic: result.statistic,
            p_value: result.p_value,
            drifted: result.p_value < config.stattest_threshold,
            reference_count,
            current_count,
        });
    }

    let number_of_columns = columns.len();
    let number_of_drifted_columns = columns.iter().filter(|c| c.drifted).count();
    let share_of_drifted_columns = if number_of_columns == 0 {
        0.0
    } else {
        number_of_drifted_columns as f64 / number_of_columns as f64
    };

    let drifted_columns: Vec<String> = columns
        .iter()
        .filter(|c| c.drifted)
        .map(|c| c.column.clone())
        .collect();

    let dataset_test = stats::drifted_columns_test(
        number_of_drifted_columns,
        number_of_columns,
        config.stattest_threshold,
    );
    let dataset_drift = share_of_drifted_columns > config.drift_share
        || dataset_test.p_value < config.dataset_significance;

    log::info!(
        "Drift comparison: {}/{} columns drifted ({:.1}%), dataset drift: {}",
        number_of_drifted_columns,
        number_of_columns,
        share_of_drifted_columns * 100.0,
        dataset_drift
    );

    Ok(DriftReport {
        generated_at: Utc::now(),
        reference_rows: reference.len(),
        current_rows: current.len(),
        number_of_columns,
        number_of_drifted_columns,
        share_of_drifted_columns,
        dataset_drift,
        dataset_test,
        drifted_columns,
        columns,
        stattest_threshold: config.stattest_threshold,
        drift_share: config.drift_share,
    })
}

fn numeric_values(records: &[RawRecord], column: &str) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(records.len());
    for value in records.iter().filter_map(|r| r.get(column)) {
        if value.is_blank() {
            continue;
        }
        values.push(value.as_number().ok_or_else(|| {
            ChurnError::SchemaMismatch(format!(
                "numeric column '{}' holds '{}'",
                column,
                value.as_category()
            ))
        })?);
    }
    Ok(values)
}

fn category_counts(records: &[RawRecord], column: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in records.iter().filter_map(|r| r.get(column)) {
        if !value.is_blank() {
            *counts.entry(value.as_category()).or_insert(0) += 1;
        }
    }
    counts
}

// ============================================================================
// MONITOR
// ============================================================================

/// Holds the reference set and the schema it is compared under.
#[derive(Debug, Clone)]
pub struct DriftMonitor {
    reference: Vec<RawRecord>,
    schema: FeatureSchema,
    config: DriftConfig,
}

impl DriftMonitor {
    pub fn new(reference: Vec<RawRecord>, schema: FeatureSchema, config: DriftConfig) -> Result<Self> {
        if reference.is_empty() {
            return Err(ChurnError::InsufficientData("reference dataset is empty".into()));
        }

        log::info!(
            "DriftMonitor initialized with reference data: {} rows, {} columns",
            reference.len(),
            schema.len()
        );

        Ok(Self { reference, schema, config })
    }

    /// Infer the schema from the reference set, skipping target and id columns.
    pub fn from_reference(reference: Vec<RawRecord>, config: DriftConfig) -> Result<Self> {
        let ids: Vec<&str> = config.id_columns.iter().map(String::as_str).collect();
        let schema = FeatureSchema::infer(&reference, &config.target_column, &ids)?;
        Self::new(reference, schema, config)
    }

    /// Use an explicit schema (e.g. the one a preprocessor was fitted on).
    pub fn with_schema(mut self, schema: FeatureSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    pub fn reference(&self) -> &[RawRecord] {
        &self.reference
    }

    pub fn compare(&self, current: &[RawRecord]) -> Result<DriftReport> {
        compare(&self.reference, current, &self.schema, &self.config)
    }

    pub fn run_checks(&self, current: &[RawRecord], report: &DriftReport) -> TestSuiteResult {
        run_checks(&self.reference, current, &self.schema, report, &self.config)
    }

    /// `check_alert` with this monitor's share threshold, logging a warning when it fires.
    pub fn check_alert(&self, report: &DriftReport) -> bool {
        let alert = check_alert(report, self.config.drift_share);
        if alert {
            log::warn!(
                "DRIFT ALERT: {:.1}% of columns drifted. Drifted features: {:?}",
                report.share_of_drifted_columns * 100.0,
                report.drifted_columns
            );
        }
        alert
    }
}
