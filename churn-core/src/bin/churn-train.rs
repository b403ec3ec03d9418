//! churn-train: fit the preprocessor and classifier, write the artifact pair.

use std::path::PathBuf;

use anyhow::Context;
use churn_core::training::{ClassificationMetrics, TrainingConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "churn-train")]
#[command(about = "Train a churn model from data/processed splits")]
#[command(version)]
struct Cli {
    /// Training config (YAML, TOML or JSON). Defaults apply when the file is missing.
    #[arg(short, long, default_value = "configs/model1.yaml")]
    config: PathBuf,

    /// Override the directory holding train.csv / val.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the artifact output directory
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

fn print_metrics(split: &str, metrics: &ClassificationMetrics) {
    println!(
        "  {:<6} accuracy={:.4} precision={:.4} recall={:.4} f1={:.4} auc={:.4} (n={})",
        split,
        metrics.accuracy,
        metrics.precision,
        metrics.recall,
        metrics.f1,
        metrics.roc_auc,
        metrics.samples
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        TrainingConfig::load_from_path(&cli.config)
            .with_context(|| format!("loading config {}", cli.config.display()))?
    } else {
        log::warn!("Config {} not found, using defaults", cli.config.display());
        TrainingConfig::default()
    };

    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.model_dir {
        config.model_dir = dir;
    }

    log::info!(
        "Training {} ({}/{})",
        config.model_params.model_type(),
        config.experiment_name,
        config.run_name
    );

    let outcome = churn_core::train_model(&config).context("training failed")?;
    let record = &outcome.record;

    println!("Training complete");
    println!("=================");
    println!("  run_id:        {}", record.run_id);
    println!("  model_version: {}", record.model_version);
    println!("  input_width:   {}", record.input_width);
    println!("  skipped_rows:  {}", record.skipped_rows);
    print_metrics("train", &record.train_metrics);
    print_metrics("val", &record.val_metrics);
    println!("  model:         {}", outcome.paths.model.display());
    println!("  preprocessor:  {}", outcome.paths.preprocessor.display());
    println!("  run record:    {}", outcome.run_record_path.display());

    Ok(())
}
