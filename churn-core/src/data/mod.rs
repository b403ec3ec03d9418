//! Data Module - CSV Datasets & Split Loading
//!
//! Reads the processed train/val/test splits into `RawRecord`s. Cleaning and
//! splitting happen upstream; this module only parses what is on disk.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ChurnError, Result};
use crate::features::{FeatureSchema, RawRecord, RawValue};

/// Rows of one CSV file plus its header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<RawRecord>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self { columns, records }
    }

    /// Parse a CSV file with a header row. Cells reading as a finite number
    /// become numbers, other non-empty cells strings; empty cells are absent.
    pub fn from_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ChurnError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("dataset not found: {}", path.display()),
            )));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut records: Vec<RawRecord> = Vec::new();
        for row in reader.records() {
            let row = row?;
            let record: RawRecord = columns
                .iter()
                .zip(row.iter())
                .filter_map(|(column, cell)| parse_cell(cell).map(|value| (column.clone(), value)))
                .collect();
            records.push(record);
        }

        log::debug!("Loaded {} rows x {} columns from {}", records.len(), columns.len(), path.display());

        Ok(Self { columns, records })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Separate feature records from boolean labels.
    ///
    /// Labels accept `Yes`/`No`, `true`/`false` and `1`/`0`; anything else,
    /// or a missing label, is a `SchemaMismatch`.
    pub fn split_target(&self, target: &str) -> Result<(Vec<RawRecord>, Vec<bool>)> {
        let mut features = Vec::with_capacity(self.records.len());
        let mut labels = Vec::with_capacity(self.records.len());

        for (row, record) in self.records.iter().enumerate() {
            let mut record = record.clone();
            let value = record.remove(target).ok_or_else(|| {
                ChurnError::SchemaMismatch(format!("row {} has no '{}' label", row + 1, target))
            })?;

            labels.push(parse_label(&value).ok_or_else(|| {
                ChurnError::SchemaMismatch(format!(
                    "row {} has unrecognised '{}' label '{}'",
                    row + 1,
                    target,
                    value.as_category()
                ))
            })?);
            features.push(record);
        }

        Ok((features, labels))
    }

    /// Infer a schema whose columns follow the CSV header order.
    pub fn infer_schema(&self, target: &str, id_columns: &[&str]) -> Result<FeatureSchema> {
        let inferred = FeatureSchema::infer(&self.records, target, id_columns)?;

        let mut columns = inferred.columns().to_vec();
        columns.sort_by_key(|c| {
            self.columns
                .iter()
                .position(|h| *h == c.name)
                .unwrap_or(usize::MAX)
        });

        FeatureSchema::new(columns, target)
    }
}

fn parse_cell(cell: &str) -> Option<RawValue> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(RawValue::Number(n)),
        _ => Some(RawValue::Text(trimmed.to_string())),
    }
}

fn parse_label(value: &RawValue) -> Option<bool> {
    match value.as_category().trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

// ============================================================================
// SPLIT LOADER
// ============================================================================

/// Loads the processed `train.csv`, `val.csv` and `test.csv` splits.
#[derive(Debug, Clone)]
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load_split(&self, name: &str) -> Result<Dataset> {
        Dataset::from_csv(&self.data_dir.join(format!("{}.csv", name)))
    }

    pub fn load_train(&self) -> Result<Dataset> {
        self.load_split("train")
    }

    pub fn load_val(&self) -> Result<Dataset> {
        self.load_split("val")
    }

    pub fn load_test(&self) -> Result<Dataset> {
        self.load_split("test")
    }
}
