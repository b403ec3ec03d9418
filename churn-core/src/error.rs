//! Error taxonomy shared by every churn-core component.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChurnError>;

#[derive(Debug, Error)]
pub enum ChurnError {
    /// Input is missing a required column or carries a value of the wrong type.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A transform was requested before the preprocessor was fitted.
    #[error("preprocessor has not been fitted")]
    NotFitted,

    /// Persisted state is missing, corrupt or incompatible.
    #[error("artifact load failure: {0}")]
    ArtifactLoadFailure(String),

    /// Predictor is not in the `Ready` state.
    #[error("service unavailable: predictor is {0}")]
    ServiceUnavailable(String),

    /// Malformed request fields.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Unexpected internal error while transforming or predicting.
    #[error("prediction failure: {0}")]
    PredictionFailure(String),

    /// Empty or degenerate dataset handed to an operation that needs rows.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ChurnError {
    /// Only an unready predictor is worth retrying; everything else is permanent
    /// for the request or the component instance.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChurnError::ServiceUnavailable(_))
    }

    /// Errors caused by the caller's input rather than by this process.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ChurnError::SchemaMismatch(_) | ChurnError::ValidationError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(ChurnError::ServiceUnavailable("loading".into()).is_retryable());
        assert!(!ChurnError::NotFitted.is_retryable());
        assert!(!ChurnError::PredictionFailure("boom".into()).is_retryable());
    }

    #[test]
    fn test_client_errors() {
        assert!(ChurnError::SchemaMismatch("missing tenure".into()).is_client_error());
        assert!(ChurnError::ValidationError("empty gender".into()).is_client_error());
        assert!(!ChurnError::ArtifactLoadFailure("gone".into()).is_client_error());
    }

    #[test]
    fn test_display() {
        let err = ChurnError::SchemaMismatch("missing column 'tenure'".into());
        assert_eq!(err.to_string(), "schema mismatch: missing column 'tenure'");
    }
}
