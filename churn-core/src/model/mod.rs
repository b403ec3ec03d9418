//! Model Module - Classifiers & Model Artifact
//!
//! One closed enum of classifier families, each fitted natively:
//! random forest, gradient boosting and logistic regression.
//! `ModelArtifact` wraps the fitted classifier with the metadata that binds
//! it to its preprocessor.

pub mod artifact;
pub mod boosting;
pub mod classifier;
pub mod forest;
pub mod linear;
pub mod params;
pub mod risk;
pub mod tree;

// Re-export common types
pub use artifact::{ModelArtifact, ModelMetadata};
pub use classifier::Classifier;
pub use params::{BoostingParams, ForestParams, LinearParams, ModelParams};
pub use risk::{RiskLevel, RiskThresholds};
