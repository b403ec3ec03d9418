use super::{Predictor, PredictorStatus};
use crate::artifact::ArtifactPaths;
use crate::error::ChurnError;
use crate::model::RiskLevel;
use crate::test_support::{fitted_pair, telco_customer, telco_records};

#[test]
fn test_unloaded_rejects_predictions() {
    let predictor = Predictor::new();
    assert_eq!(predictor.status(), PredictorStatus::Unloaded);
    assert_eq!(predictor.model_version(), None);

    match predictor.predict_single(&telco_customer(0)) {
        Err(err @ ChurnError::ServiceUnavailable(_)) => {
            assert!(err.is_retryable());
            assert!(err.to_string().contains("unloaded"));
        }
        other => panic!("expected ServiceUnavailable, got {:?}", other),
    }
}

#[test]
fn test_load_success() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());
    let pair = fitted_pair();
    pair.save(&paths).unwrap();

    let predictor = Predictor::new();
    predictor.load(&paths).unwrap();

    assert!(predictor.is_ready());
    assert_eq!(predictor.model_version(), Some(pair.model().version_tag()));
    assert_eq!(predictor.failure_reason(), None);
}

#[test]
fn test_load_failure_is_permanent() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());

    let predictor = Predictor::new();
    assert!(matches!(
        predictor.load(&paths),
        Err(ChurnError::ArtifactLoadFailure(_))
    ));
    assert_eq!(predictor.status(), PredictorStatus::Failed);
    assert!(predictor.failure_reason().unwrap().contains("not found"));

    // Artifacts appearing later do not revive it
    fitted_pair().save(&paths).unwrap();
    assert!(predictor.load(&paths).is_err());
    assert_eq!(predictor.status(), PredictorStatus::Failed);

    assert!(matches!(
        predictor.predict_batch(&telco_records(2)),
        Err(ChurnError::ServiceUnavailable(_))
    ));
}

#[test]
fn test_batch_predictions() {
    let predictor = Predictor::from_pair(fitted_pair());
    let records = telco_records(25);

    let results = predictor.predict_batch(&records).unwrap();
    assert_eq!(results.len(), 25);

    for result in &results {
        assert!((0.0..=1.0).contains(&result.churn_probability));
        assert_eq!(result.will_churn, result.churn_probability > 0.5);
        assert_eq!(result.risk_level, RiskLevel::from_probability(result.churn_probability));
    }
}

#[test]
fn test_single_matches_batch() {
    let predictor = Predictor::from_pair(fitted_pair());
    let records = telco_records(5);

    let batch = predictor.predict_batch(&records).unwrap();
    for (record, expected) in records.iter().zip(&batch) {
        assert_eq!(&predictor.predict_single(record).unwrap(), expected);
    }
}

#[test]
fn test_empty_batch() {
    let predictor = Predictor::from_pair(fitted_pair());
    assert!(predictor.predict_batch(&[]).unwrap().is_empty());
}

#[test]
fn test_unknown_category_is_scored() {
    let predictor = Predictor::from_pair(fitted_pair());
    let record = telco_customer(3).with("Contract", "Three year");

    let result = predictor.predict_single(&record).unwrap();
    assert!((0.0..=1.0).contains(&result.churn_probability));
}

#[test]
fn test_missing_column_is_client_error() {
    let predictor = Predictor::from_pair(fitted_pair());
    let mut record = telco_customer(3);
    record.remove("tenure");

    let err = predictor.predict_single(&record).unwrap_err();
    assert!(matches!(err, ChurnError::SchemaMismatch(_)));
    assert!(err.is_client_error());
}
