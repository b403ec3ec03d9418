//! churn-drift: compare production data against the training reference.

use std::path::PathBuf;

use anyhow::Context;
use churn_core::drift::{monitor_production_data, DriftConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "churn-drift")]
#[command(about = "Detect distribution drift between reference and current data")]
#[command(version)]
struct Cli {
    /// Current (production) data CSV
    #[arg(short, long)]
    current: PathBuf,

    /// Reference data CSV
    #[arg(short, long, default_value = "data/processed/train.csv")]
    reference: PathBuf,

    /// Directory for drift_metrics_*.json and drift_report_*.txt
    #[arg(short, long, default_value = "reports/drift")]
    output_dir: PathBuf,

    /// Per-column p-value threshold
    #[arg(long, default_value_t = churn_core::constants::DEFAULT_STATTEST_THRESHOLD)]
    stattest_threshold: f64,

    /// Drifted-column share that triggers an alert
    #[arg(long, default_value_t = churn_core::constants::DEFAULT_DRIFT_SHARE)]
    drift_share: f64,

    /// Exit with status 2 when an alert fires
    #[arg(long)]
    fail_on_alert: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = DriftConfig {
        stattest_threshold: cli.stattest_threshold,
        drift_share: cli.drift_share,
        ..DriftConfig::default()
    };

    let summary = monitor_production_data(&cli.reference, &cli.current, &cli.output_dir, config)
        .with_context(|| format!("monitoring {}", cli.current.display()))?;

    println!("Drift Monitoring Summary");
    println!("========================");
    println!("  dataset drift:   {}", summary.dataset_drift_detected);
    println!(
        "  drifted columns: {} ({:.1}%)",
        summary.number_of_drifted_columns,
        summary.share_of_drifted_columns * 100.0
    );
    if !summary.drifted_features.is_empty() {
        println!("  drifted:         {}", summary.drifted_features.join(", "));
    }
    println!("  tests passed:    {}", summary.tests_passed);
    for failed in summary.tests.failed() {
        println!("    FAILED {}: {}", failed.name, failed.detail);
    }
    println!("  alert:           {}", summary.alert_triggered);
    if let Some(files) = &summary.files {
        println!("  metrics:         {}", files.metrics.display());
        println!("  report:          {}", files.text.display());
    }

    if cli.fail_on_alert && summary.alert_triggered {
        std::process::exit(2);
    }

    Ok(())
}
