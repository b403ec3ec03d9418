//! Drift test suite: pass/fail checks over a comparison.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{DriftConfig, DriftReport};
use crate::features::{FeatureSchema, RawRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub checks: Vec<CheckResult>,
    pub all_passed: bool,
}

impl TestSuiteResult {
    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

fn check(name: &str, passed: bool, detail: String) -> CheckResult {
    CheckResult { name: name.to_string(), passed, detail }
}

fn column_set(records: &[RawRecord]) -> BTreeSet<&str> {
    records.iter().flat_map(RawRecord::columns).collect()
}

/// Run every check. Column counts compare the columns present anywhere in
/// each dataset; type checks cover the schema's numeric columns.
pub fn run_checks(
    reference: &[RawRecord],
    current: &[RawRecord],
    schema: &FeatureSchema,
    report: &DriftReport,
    config: &DriftConfig,
) -> TestSuiteResult {
    let reference_columns = column_set(reference);
    let current_columns = column_set(current);

    let retyped: Vec<&str> = schema
        .numeric_columns()
        .filter(|column| {
            current
                .iter()
                .filter_map(|r| r.get(column))
                .any(|v| !v.is_blank() && v.as_number().is_none())
        })
        .collect();

    let checks = vec![
        check(
            "number_of_columns",
            reference_columns.len() == current_columns.len(),
            format!(
                "reference {} columns, current {}",
                reference_columns.len(),
                current_columns.len()
            ),
        ),
        check(
            "number_of_rows",
            !current.is_empty(),
            format!("current {} rows", current.len()),
        ),
        check(
            "column_types",
            retyped.is_empty(),
            if retyped.is_empty() {
                "numeric columns unchanged".to_string()
            } else {
                format!("no longer numeric: {}", retyped.join(", "))
            },
        ),
        check(
            "number_of_drifted_columns",
            report.number_of_drifted_columns < config.max_drifted_columns,
            format!(
                "{} drifted (must be < {})",
                report.number_of_drifted_columns, config.max_drifted_columns
            ),
        ),
        check(
            "share_of_drifted_columns",
            report.share_of_drifted_columns < config.drift_share,
            format!(
                "{:.3} drifted (must be < {})",
                report.share_of_drifted_columns, config.drift_share
            ),
        ),
    ];

    let all_passed = checks.iter().all(|c| c.passed);
    for failed in checks.iter().filter(|c| !c.passed) {
        log::warn!("Drift check '{}' failed: {}", failed.name, failed.detail);
    }

    TestSuiteResult { checks, all_passed }
}
