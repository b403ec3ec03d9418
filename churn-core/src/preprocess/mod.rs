//! Preprocess Module - Train/Serve Feature Transformation
//!
//! `fit` learns per-column scaling and category vocabularies from training
//! records; the resulting `FittedPreprocessorState` is the only thing
//! inference needs to reproduce the exact same transformation.
//!
//! Output layout: scaled numeric columns in schema order, followed by one
//! one-hot block per categorical column in schema order.

pub mod state;

#[cfg(test)]
mod tests;

use ndarray::Array2;

use crate::error::{ChurnError, Result};
use crate::features::{ColumnKind, FeatureSchema, RawRecord, RawValue};

pub use state::{
    CategoricalEncoding, DropPolicy, FittedPreprocessorState, NumericScaler, UnknownPolicy,
};

/// Relative standard deviation below which a column is treated as constant.
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessorOptions {
    pub drop: DropPolicy,
    pub unknown: UnknownPolicy,
}

/// A preprocessor is either waiting to be fitted or holds a fitted state.
#[derive(Debug, Clone)]
pub enum Preprocessor {
    Unfitted {
        schema: FeatureSchema,
        options: PreprocessorOptions,
    },
    Fitted(FittedPreprocessorState),
}

impl Preprocessor {
    pub fn new(schema: FeatureSchema) -> Self {
        Self::with_options(schema, PreprocessorOptions::default())
    }

    pub fn with_options(schema: FeatureSchema, options: PreprocessorOptions) -> Self {
        Preprocessor::Unfitted { schema, options }
    }

    /// Wrap an already fitted (e.g. restored) state.
    pub fn fitted(state: FittedPreprocessorState) -> Self {
        Preprocessor::Fitted(state)
    }

    pub fn schema(&self) -> &FeatureSchema {
        match self {
            Preprocessor::Unfitted { schema, .. } => schema,
            Preprocessor::Fitted(state) => state.schema(),
        }
    }

    pub fn state(&self) -> Option<&FittedPreprocessorState> {
        match self {
            Preprocessor::Unfitted { .. } => None,
            Preprocessor::Fitted(state) => Some(state),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.state().is_some()
    }

    /// Learn a new state from `records`. Never mutates `self`: fitting an
    /// already fitted preprocessor yields a fresh version over the same schema.
    pub fn fit(&self, records: &[RawRecord]) -> Result<FittedPreprocessorState> {
        let options = match self {
            Preprocessor::Unfitted { options, .. } => *options,
            Preprocessor::Fitted(state) => options_of(state),
        };
        fit(self.schema(), records, options)
    }

    /// Fit, then transform the same records.
    pub fn fit_transform(
        &self,
        records: &[RawRecord],
    ) -> Result<(FittedPreprocessorState, Array2<f64>)> {
        let state = self.fit(records)?;
        let matrix = state.transform(records)?;
        Ok((state, matrix))
    }

    pub fn transform(&self, records: &[RawRecord]) -> Result<Array2<f64>> {
        match self {
            Preprocessor::Unfitted { .. } => Err(ChurnError::NotFitted),
            Preprocessor::Fitted(state) => state.transform(records),
        }
    }
}

/// Transform `records` with a fitted `state`.
pub fn transform(records: &[RawRecord], state: &FittedPreprocessorState) -> Result<Array2<f64>> {
    state.transform(records)
}

fn options_of(state: &FittedPreprocessorState) -> PreprocessorOptions {
    state
        .categorical()
        .first()
        .map(|c| PreprocessorOptions { drop: c.drop, unknown: c.unknown })
        .unwrap_or_default()
}

/// Compute per-numeric-column mean/std and per-categorical-column vocabulary.
///
/// Columns outside the schema are ignored; blank cells are skipped. A schema
/// column with no value in any record is a `SchemaMismatch`.
pub fn fit(
    schema: &FeatureSchema,
    records: &[RawRecord],
    options: PreprocessorOptions,
) -> Result<FittedPreprocessorState> {
    let absent: Vec<&str> = schema
        .columns()
        .iter()
        .filter(|c| !records.iter().any(|r| present(r.get(&c.name))))
        .map(|c| c.name.as_str())
        .collect();

    if !absent.is_empty() {
        return Err(ChurnError::SchemaMismatch(format!(
            "required columns entirely absent from training data: {}",
            absent.join(", ")
        )));
    }

    let mut numeric = Vec::new();
    for column in schema.numeric_columns() {
        numeric.push(fit_scaler(column, records)?);
    }

    let mut categorical = Vec::new();
    let mut offset = numeric.len();
    for column in schema.categorical_columns() {
        let encoding = fit_encoding(column, records, options, offset);
        offset += encoding.width();
        categorical.push(encoding);
    }

    let state = FittedPreprocessorState::new(schema.clone(), numeric, categorical, records.len());

    log::info!(
        "Preprocessor fitted on {} rows: {} numeric, {} categorical -> width {}",
        records.len(),
        state.numeric().len(),
        state.categorical().len(),
        state.output_width()
    );

    Ok(state)
}

fn present(value: Option<&RawValue>) -> bool {
    value.is_some_and(|v| !v.is_blank())
}

fn fit_scaler(column: &str, records: &[RawRecord]) -> Result<NumericScaler> {
    let mut values = Vec::with_capacity(records.len());

    for value in records.iter().filter_map(|r| r.get(column)) {
        if value.is_blank() {
            continue;
        }
        let number = value.as_number().ok_or_else(|| {
            ChurnError::SchemaMismatch(format!(
                "column '{}' is declared {:?} but holds '{}'",
                column,
                ColumnKind::Numeric,
                value.as_category()
            ))
        })?;
        values.push(number);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let mut std = variance.sqrt();

    if std <= ZERO_VARIANCE_TOLERANCE * mean.abs().max(1.0) {
        std = 0.0;
    }

    Ok(NumericScaler { column: column.to_string(), mean, std })
}

fn fit_encoding(
    column: &str,
    records: &[RawRecord],
    options: PreprocessorOptions,
    offset: usize,
) -> CategoricalEncoding {
    let mut categories: Vec<String> = Vec::new();

    for value in records.iter().filter_map(|r| r.get(column)) {
        if value.is_blank() {
            continue;
        }
        let category = value.as_category();
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    CategoricalEncoding {
        column: column.to_string(),
        categories,
        drop: options.drop,
        unknown: options.unknown,
        offset,
    }
}
