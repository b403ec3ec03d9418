//! Feature Schema - Centralized Column Definition
//!
//! **This file controls which raw columns become model features.**
//!
//! ## Rules:
//! 1. Column order is significant: it fixes the order of the transformed vector
//! 2. Changing a column name, kind or position changes the layout hash
//! 3. The target column is never a feature
//!
//! The layout hash is what lets a persisted preprocessor and a persisted model
//! prove they were built against the same columns.

use std::collections::HashSet;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::record::RawRecord;
use crate::constants::DEFAULT_TARGET_COLUMN;
use crate::error::{ChurnError, Result};

// ============================================================================
// COLUMN KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    fn tag(self) -> u8 {
        match self {
            ColumnKind::Numeric => b'n',
            ColumnKind::Categorical => b'c',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ColumnKind::Numeric }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ColumnKind::Categorical }
    }
}

// ============================================================================
// TELCO LAYOUT (Authoritative source)
// ============================================================================

/// Telco customer columns in the order they appear in the dataset.
pub const TELCO_LAYOUT: &[(&str, ColumnKind)] = &[
    // === Demographics ===
    ("gender", ColumnKind::Categorical),
    ("SeniorCitizen", ColumnKind::Numeric),
    ("Partner", ColumnKind::Categorical),
    ("Dependents", ColumnKind::Categorical),

    // === Services ===
    ("tenure", ColumnKind::Numeric),
    ("PhoneService", ColumnKind::Categorical),
    ("MultipleLines", ColumnKind::Categorical),
    ("InternetService", ColumnKind::Categorical),
    ("OnlineSecurity", ColumnKind::Categorical),
    ("OnlineBackup", ColumnKind::Categorical),
    ("DeviceProtection", ColumnKind::Categorical),
    ("TechSupport", ColumnKind::Categorical),
    ("StreamingTV", ColumnKind::Categorical),
    ("StreamingMovies", ColumnKind::Categorical),

    // === Contract & billing ===
    ("Contract", ColumnKind::Categorical),
    ("PaperlessBilling", ColumnKind::Categorical),
    ("PaymentMethod", ColumnKind::Categorical),
    ("MonthlyCharges", ColumnKind::Numeric),
    ("TotalCharges", ColumnKind::Numeric),
];

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered set of feature columns plus the target column. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<ColumnSpec>,
    target: String,
}

impl FeatureSchema {
    pub fn new(columns: Vec<ColumnSpec>, target: impl Into<String>) -> Result<Self> {
        let target = target.into();

        if columns.is_empty() {
            return Err(ChurnError::SchemaMismatch("schema has no feature columns".into()));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name == target {
                return Err(ChurnError::SchemaMismatch(format!(
                    "target column '{}' cannot also be a feature",
                    target
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ChurnError::SchemaMismatch(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns, target })
    }

    /// Canonical telco churn schema.
    pub fn telco() -> Self {
        Self {
            columns: TELCO_LAYOUT
                .iter()
                .map(|(name, kind)| ColumnSpec { name: name.to_string(), kind: *kind })
                .collect(),
            target: DEFAULT_TARGET_COLUMN.to_string(),
        }
    }

    /// Infer a schema from records: a column is numeric when every present,
    /// non-blank value reads as a number, categorical otherwise. Columns keep
    /// the order in which they are first seen; target and id columns are skipped.
    pub fn infer(records: &[RawRecord], target: &str, id_columns: &[&str]) -> Result<Self> {
        let mut order: Vec<String> = Vec::new();
        let mut numeric: Vec<bool> = Vec::new();

        for record in records {
            for (name, value) in record.iter() {
                if name == target || id_columns.contains(&name) {
                    continue;
                }

                let index = match order.iter().position(|n| n == name) {
                    Some(index) => index,
                    None => {
                        order.push(name.to_string());
                        numeric.push(true);
                        order.len() - 1
                    }
                };

                if !value.is_blank() && value.as_number().is_none() {
                    numeric[index] = false;
                }
            }
        }

        let columns = order
            .into_iter()
            .zip(numeric)
            .map(|(name, is_numeric)| ColumnSpec {
                name,
                kind: if is_numeric { ColumnKind::Numeric } else { ColumnKind::Categorical },
            })
            .collect();

        Self::new(columns, target)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.columns_of(ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &str> {
        self.columns_of(ColumnKind::Categorical)
    }

    fn columns_of(&self, kind: ColumnKind) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.name.as_str())
    }

    /// Fail with `SchemaMismatch` naming every feature column absent from `record`.
    pub fn validate_record(&self, record: &RawRecord) -> Result<()> {
        let missing: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| !record.contains(&c.name))
            .map(|c| c.name.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ChurnError::SchemaMismatch(format!(
                "missing required columns: {}",
                missing.join(", ")
            )))
        }
    }

    /// CRC32 of the ordered (name, kind) pairs.
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        for column in &self.columns {
            hasher.update(column.name.as_bytes());
            hasher.update(&[0, column.kind.tag(), 0]);
        }
        hasher.finalize()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::telco()
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over an ordered list of names, used for transformed output layouts.
pub fn names_hash<'a>(names: impl IntoIterator<Item = &'a str>) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telco_schema() {
        let schema = FeatureSchema::telco();
        assert_eq!(schema.len(), 19);
        assert_eq!(schema.target(), "Churn");
        assert_eq!(schema.numeric_columns().count(), 4);
        assert_eq!(schema.categorical_columns().count(), 15);
        assert_eq!(schema.column("Contract").map(|c| c.kind), Some(ColumnKind::Categorical));
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(FeatureSchema::telco().layout_hash(), FeatureSchema::telco().layout_hash());
        assert_ne!(FeatureSchema::telco().layout_hash(), 0);
    }

    #[test]
    fn test_layout_hash_sees_kind_changes() {
        let a = FeatureSchema::new(vec![ColumnSpec::numeric("x")], "y").unwrap();
        let b = FeatureSchema::new(vec![ColumnSpec::categorical("x")], "y").unwrap();
        assert_ne!(a.layout_hash(), b.layout_hash());
    }

    #[test]
    fn test_names_hash_order_sensitive() {
        assert_ne!(names_hash(["a", "b"]), names_hash(["b", "a"]));
        assert_ne!(names_hash(["ab", "c"]), names_hash(["a", "bc"]));
    }

    #[test]
    fn test_rejects_duplicates_and_target() {
        assert!(FeatureSchema::new(
            vec![ColumnSpec::numeric("x"), ColumnSpec::categorical("x")],
            "y"
        )
        .is_err());
        assert!(FeatureSchema::new(vec![ColumnSpec::numeric("y")], "y").is_err());
        assert!(FeatureSchema::new(vec![], "y").is_err());
    }

    #[test]
    fn test_validate_record_lists_missing() {
        let schema = FeatureSchema::new(
            vec![ColumnSpec::numeric("tenure"), ColumnSpec::categorical("Contract")],
            "Churn",
        )
        .unwrap();

        let record = RawRecord::new().with("tenure", 3.0);
        match schema.validate_record(&record) {
            Err(ChurnError::SchemaMismatch(msg)) => assert!(msg.contains("Contract")),
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }

        // Target column is not required
        let full = record.with("Contract", "One year");
        assert!(schema.validate_record(&full).is_ok());
    }
}
