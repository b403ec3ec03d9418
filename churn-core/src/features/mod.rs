//! Features Module - Feature Schema & Raw Records
//!
//! Describes which raw columns are features, their semantic kind and the
//! target, plus the raw record type every other component consumes.

pub mod layout;
pub mod record;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{names_hash, ColumnKind, ColumnSpec, FeatureSchema, TELCO_LAYOUT};
pub use record::{RawRecord, RawValue};
