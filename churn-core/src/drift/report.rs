//! Drift report rendering, persistence and the monitoring job.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::checks::TestSuiteResult;
use super::{DriftConfig, DriftMonitor, DriftReport};
use crate::artifact::save_json;
use crate::data::Dataset;
use crate::error::Result;

impl DriftReport {
    /// Human-readable summary.
    pub fn render_text(&self) -> String {
        let rule = "=".repeat(70);
        let mut out = String::new();

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "DRIFT MONITORING REPORT");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Generated:              {}", self.generated_at.to_rfc3339());
        let _ = writeln!(out, "Reference rows:         {}", self.reference_rows);
        let _ = writeln!(out, "Current rows:           {}", self.current_rows);
        let _ = writeln!(out, "Dataset drift detected: {}", self.dataset_drift);
        let _ = writeln!(
            out,
            "Drifted columns:        {} of {}",
            self.number_of_drifted_columns, self.number_of_columns
        );
        let _ = writeln!(out, "Share drifted:          {:.1}%", self.share_of_drifted_columns * 100.0);
        let _ = writeln!(out, "Dataset test p-value:   {:.6}", self.dataset_test.p_value);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:<20} {:<12} {:>12} {:>12}  drift", "column", "test", "statistic", "p-value");

        for column in &self.columns {
            let test = match column.stattest {
                super::StatTest::KolmogorovSmirnov => "ks",
                super::StatTest::ChiSquare => "chisquare",
            };
            let _ = writeln!(
                out,
                "{:<20} {:<12} {:>12.4} {:>12.6}  {}",
                column.column,
                test,
                column.statistic,
                column.p_value,
                if column.drifted { "YES" } else { "no" }
            );
        }

        let _ = writeln!(out, "{}", rule);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub metrics: PathBuf,
    pub text: PathBuf,
}

/// Write `drift_metrics_<timestamp>.json` and `drift_report_<timestamp>.txt`.
pub fn save_report(report: &DriftReport, dir: &Path) -> Result<ReportFiles> {
    fs::create_dir_all(dir)?;

    let timestamp = report.generated_at.format("%Y%m%d_%H%M%S");
    let files = ReportFiles {
        metrics: dir.join(format!("drift_metrics_{}.json", timestamp)),
        text: dir.join(format!("drift_report_{}.txt", timestamp)),
    };

    save_json(report, &files.metrics)?;
    fs::write(&files.text, report.render_text())?;

    log::info!("Drift report saved: {}", files.metrics.display());
    Ok(files)
}

/// Outcome of one monitoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftSummary {
    pub dataset_drift_detected: bool,
    pub number_of_drifted_columns: usize,
    pub share_of_drifted_columns: f64,
    pub drifted_features: Vec<String>,
    pub tests_passed: bool,
    pub alert_triggered: bool,
    pub report: DriftReport,
    pub tests: TestSuiteResult,
    #[serde(skip)]
    pub files: Option<ReportFiles>,
}

/// Compare a current CSV against a reference CSV, run the test suite, decide
/// on an alert and save the report under `output_dir`.
pub fn monitor_production_data(
    reference_csv: &Path,
    current_csv: &Path,
    output_dir: &Path,
    config: DriftConfig,
) -> Result<DriftSummary> {
    let monitor = DriftMonitor::from_reference(Dataset::from_csv(reference_csv)?.into_records(), config)?;

    let current = Dataset::from_csv(current_csv)?.into_records();
    log::info!("Loaded current data: {} rows", current.len());

    let report = monitor.compare(&current)?;
    let tests = monitor.run_checks(&current, &report);
    let alert_triggered = monitor.check_alert(&report);
    let files = save_report(&report, output_dir)?;

    Ok(DriftSummary {
        dataset_drift_detected: report.dataset_drift,
        number_of_drifted_columns: report.number_of_drifted_columns,
        share_of_drifted_columns: report.share_of_drifted_columns,
        drifted_features: report.drifted_columns.clone(),
        tests_passed: tests.all_passed,
        alert_triggered,
        report,
        tests,
        files: Some(files),
    })
}
