//! Fitted preprocessor state
//!
//! Written once by `Preprocessor::fit`, read-only afterwards. Refitting
//! produces a new value with a new `run_id`; nothing here is mutated in place.

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayViewMut1};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::error::{ChurnError, Result};
use crate::features::{names_hash, FeatureSchema, RawRecord, RawValue};

// ============================================================================
// NUMERIC SCALING
// ============================================================================

/// Standard scaling parameters for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericScaler {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation. Exactly 0.0 for a constant column.
    pub std: f64,
}

impl NumericScaler {
    /// `(value - mean) / std`, or 0.0 for a zero-variance column.
    pub fn scale(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

// ============================================================================
// CATEGORICAL ENCODING
// ============================================================================

/// Which observed category, if any, is left out of the one-hot block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Keep every observed category.
    None,
    /// Drop the first category seen during fit (avoids perfect collinearity).
    #[default]
    First,
}

/// What a category never seen during fit encodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPolicy {
    /// The whole block for the column is zero. Never adds a column, never fails.
    #[default]
    AllZero,
}

/// One-hot block for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoding {
    pub column: String,
    /// Every category observed during fit, in first-seen order.
    pub categories: Vec<String>,
    pub drop: DropPolicy,
    pub unknown: UnknownPolicy,
    /// Position of the block's first output column.
    pub offset: usize,
}

impl CategoricalEncoding {
    fn dropped_count(&self) -> usize {
        match self.drop {
            DropPolicy::First if !self.categories.is_empty() => 1,
            _ => 0,
        }
    }

    /// Number of output columns in the block.
    pub fn width(&self) -> usize {
        self.categories.len() - self.dropped_count()
    }

    /// Categories that own an output column, in output order.
    pub fn retained(&self) -> &[String] {
        &self.categories[self.dropped_count()..]
    }

    /// Category dropped from the block, if any.
    pub fn dropped(&self) -> Option<&str> {
        match self.dropped_count() {
            0 => None,
            _ => self.categories.first().map(String::as_str),
        }
    }

    /// Position of `category` within the block. `None` means the all-zero
    /// encoding: either the dropped category or an unknown one.
    pub fn position(&self, category: &str) -> Option<usize> {
        let index = self.categories.iter().position(|c| c == category)?;
        index.checked_sub(self.dropped_count())
    }
}

// ============================================================================
// FITTED STATE
// ============================================================================

/// Everything needed to reproduce the training-time transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessorState {
    format_version: u32,
    run_id: Uuid,
    fitted_at: DateTime<Utc>,
    schema: FeatureSchema,
    numeric: Vec<NumericScaler>,
    categorical: Vec<CategoricalEncoding>,
    output_width: usize,
    layout_hash: u32,
    training_rows: usize,
}

impl FittedPreprocessorState {
    pub(crate) fn new(
        schema: FeatureSchema,
        numeric: Vec<NumericScaler>,
        categorical: Vec<CategoricalEncoding>,
        training_rows: usize,
    ) -> Self {
        let mut state = Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            run_id: Uuid::new_v4(),
            fitted_at: Utc::now(),
            schema,
            numeric,
            categorical,
            output_width: 0,
            layout_hash: 0,
            training_rows,
        };
        state.output_width = state.computed_width();
        state.layout_hash = state.computed_layout_hash();
        state
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn numeric(&self) -> &[NumericScaler] {
        &self.numeric
    }

    pub fn categorical(&self) -> &[CategoricalEncoding] {
        &self.categorical
    }

    /// Length of every transformed vector.
    pub fn output_width(&self) -> usize {
        self.output_width
    }

    /// CRC32 of the output feature names.
    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }

    pub fn encoding(&self, column: &str) -> Option<&CategoricalEncoding> {
        self.categorical.iter().find(|c| c.column == column)
    }

    /// Output column names: numeric columns first, then `<column>_<category>`
    /// for every retained category.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|n| n.column.clone()).collect();
        for encoding in &self.categorical {
            names.extend(
                encoding
                    .retained()
                    .iter()
                    .map(|category| format!("{}_{}", encoding.column, category)),
            );
        }
        names
    }

    fn computed_width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(CategoricalEncoding::width).sum::<usize>()
    }

    fn computed_layout_hash(&self) -> u32 {
        let names = self.feature_names();
        names_hash(names.iter().map(String::as_str))
    }

    /// SHA-256 over the canonical JSON encoding of the whole state.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// Structural checks run after restoring a persisted state.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ChurnError::ArtifactLoadFailure(format!(
                "unsupported preprocessor format v{} (expected v{})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        let width = self.computed_width();
        if width != self.output_width {
            return Err(ChurnError::ArtifactLoadFailure(format!(
                "preprocessor declares width {} but its encoders produce {}",
                self.output_width, width
            )));
        }

        let mut expected_offset = self.numeric.len();
        for encoding in &self.categorical {
            if encoding.offset != expected_offset {
                return Err(ChurnError::ArtifactLoadFailure(format!(
                    "block for '{}' starts at {} (expected {})",
                    encoding.column, encoding.offset, expected_offset
                )));
            }
            expected_offset += encoding.width();
        }

        let hash = self.computed_layout_hash();
        if hash != self.layout_hash {
            return Err(ChurnError::ArtifactLoadFailure(format!(
                "preprocessor layout hash {:08x} does not match its encoders ({:08x})",
                self.layout_hash, hash
            )));
        }

        Ok(())
    }

    /// Transform a batch into an `n x output_width` matrix.
    pub fn transform(&self, records: &[RawRecord]) -> Result<Array2<f64>> {
        let mut matrix = Array2::<f64>::zeros((records.len(), self.output_width));
        for (record, row) in records.iter().zip(matrix.rows_mut()) {
            self.write_row(record, row)?;
        }
        Ok(matrix)
    }

    /// Transform one record into a vector of `output_width` floats.
    pub fn transform_one(&self, record: &RawRecord) -> Result<Vec<f64>> {
        let matrix = self.transform(std::slice::from_ref(record))?;
        Ok(matrix.row(0).to_vec())
    }

    fn write_row(&self, record: &RawRecord, mut row: ArrayViewMut1<f64>) -> Result<()> {
        self.schema.validate_record(record)?;

        for (position, scaler) in self.numeric.iter().enumerate() {
            let value = numeric_cell(record, &scaler.column)?;
            row[position] = scaler.scale(value);
        }

        for encoding in &self.categorical {
            let category = record
                .get(&encoding.column)
                .map(RawValue::as_category)
                .unwrap_or_default();
            if let Some(position) = encoding.position(&category) {
                row[encoding.offset + position] = 1.0;
            }
        }

        Ok(())
    }
}

fn numeric_cell(record: &RawRecord, column: &str) -> Result<f64> {
    let value = record
        .get(column)
        .ok_or_else(|| ChurnError::SchemaMismatch(format!("missing required column '{}'", column)))?;

    value.as_number().ok_or_else(|| {
        ChurnError::SchemaMismatch(format!(
            "column '{}' expects a numeric value, got '{}'",
            column,
            value.as_category()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract_block(drop: DropPolicy) -> CategoricalEncoding {
        CategoricalEncoding {
            column: "Contract".into(),
            categories: vec!["Month-to-month".into(), "One year".into(), "Two year".into()],
            drop,
            unknown: UnknownPolicy::AllZero,
            offset: 0,
        }
    }

    #[test]
    fn test_zero_variance_scales_to_zero() {
        let scaler = NumericScaler { column: "x".into(), mean: 5.0, std: 0.0 };
        assert_eq!(scaler.scale(5.0), 0.0);
        assert_eq!(scaler.scale(1000.0), 0.0);
    }

    #[test]
    fn test_standard_scaling() {
        let scaler = NumericScaler { column: "x".into(), mean: 10.0, std: 2.0 };
        assert_eq!(scaler.scale(14.0), 2.0);
        assert_eq!(scaler.scale(8.0), -1.0);
    }

    #[test]
    fn test_drop_first_positions() {
        let block = contract_block(DropPolicy::First);
        assert_eq!(block.width(), 2);
        assert_eq!(block.dropped(), Some("Month-to-month"));
        assert_eq!(block.position("Month-to-month"), None);
        assert_eq!(block.position("One year"), Some(0));
        assert_eq!(block.position("Two year"), Some(1));
        assert_eq!(block.position("Three year"), None);
    }

    #[test]
    fn test_keep_all_positions() {
        let block = contract_block(DropPolicy::None);
        assert_eq!(block.width(), 3);
        assert_eq!(block.dropped(), None);
        assert_eq!(block.position("Month-to-month"), Some(0));
        assert_eq!(block.position("Three year"), None);
    }

    #[test]
    fn test_single_category_block_is_empty_when_dropping() {
        let block = CategoricalEncoding {
            column: "PhoneService".into(),
            categories: vec!["Yes".into()],
            drop: DropPolicy::First,
            unknown: UnknownPolicy::AllZero,
            offset: 0,
        };
        assert_eq!(block.width(), 0);
        assert!(block.retained().is_empty());
    }
}
