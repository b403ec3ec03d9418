//! Fit/transform behaviour over a small contract dataset

use super::{fit, DropPolicy, Preprocessor, PreprocessorOptions};
use crate::error::ChurnError;
use crate::features::{ColumnSpec, FeatureSchema, RawRecord};

fn schema() -> FeatureSchema {
    FeatureSchema::new(
        vec![
            ColumnSpec::numeric("tenure"),
            ColumnSpec::categorical("Contract"),
            ColumnSpec::numeric("MonthlyCharges"),
        ],
        "Churn",
    )
    .unwrap()
}

fn customer(tenure: f64, contract: &str, charges: f64) -> RawRecord {
    RawRecord::new()
        .with("tenure", tenure)
        .with("Contract", contract)
        .with("MonthlyCharges", charges)
        .with("Churn", "No")
}

fn training_set() -> Vec<RawRecord> {
    vec![
        customer(1.0, "Month-to-month", 29.85),
        customer(34.0, "One year", 56.95),
        customer(2.0, "Month-to-month", 53.85),
        customer(45.0, "One year", 42.30),
        customer(72.0, "Two year", 89.10),
        customer(10.0, "Two year", 70.70),
    ]
}

#[test]
fn test_transform_before_fit_fails() {
    let preprocessor = Preprocessor::new(schema());
    assert!(!preprocessor.is_fitted());
    assert!(matches!(
        preprocessor.transform(&training_set()),
        Err(ChurnError::NotFitted)
    ));
}

#[test]
fn test_fit_learns_scaling_and_vocabulary() {
    let state = Preprocessor::new(schema()).fit(&training_set()).unwrap();

    assert_eq!(state.training_rows(), 6);
    assert_eq!(state.numeric().len(), 2);
    assert_eq!(state.numeric()[0].column, "tenure");
    assert!((state.numeric()[0].mean - 164.0 / 6.0).abs() < 1e-12);

    let contract = state.encoding("Contract").unwrap();
    assert_eq!(contract.categories, vec!["Month-to-month", "One year", "Two year"]);
    assert_eq!(contract.dropped(), Some("Month-to-month"));
    assert_eq!(contract.offset, 2);

    // 2 numeric + 3 categories minus the dropped one
    assert_eq!(state.output_width(), 4);
    assert_eq!(
        state.feature_names(),
        vec!["tenure", "MonthlyCharges", "Contract_One year", "Contract_Two year"]
    );
    assert!(state.validate().is_ok());
}

#[test]
fn test_contract_blocks() {
    let state = Preprocessor::new(schema()).fit(&training_set()).unwrap();

    let two_year = state.transform_one(&customer(5.0, "Two year", 50.0)).unwrap();
    let monthly = state.transform_one(&customer(5.0, "Month-to-month", 50.0)).unwrap();
    let novel = state.transform_one(&customer(5.0, "Three year", 50.0)).unwrap();

    assert_eq!(&two_year[2..], &[0.0, 1.0]);
    assert_eq!(&monthly[2..], &[0.0, 0.0]);
    assert_ne!(&two_year[2..], &monthly[2..]);

    // Unseen category: all-zero block, no new column, no error
    assert_eq!(novel.len(), state.output_width());
    assert_eq!(&novel[2..], &[0.0, 0.0]);

    // Numeric part does not depend on the category
    assert_eq!(&two_year[..2], &novel[..2]);
}

#[test]
fn test_transform_is_deterministic() {
    let state = Preprocessor::new(schema()).fit(&training_set()).unwrap();
    let records = training_set();

    let first = state.transform(&records).unwrap();
    let second = state.transform(&records).unwrap();

    let first_bits: Vec<u64> = first.iter().map(|v| v.to_bits()).collect();
    let second_bits: Vec<u64> = second.iter().map(|v| v.to_bits()).collect();
    assert_eq!(first_bits, second_bits);
}

#[test]
fn test_every_row_has_fitted_width() {
    let state = Preprocessor::new(schema()).fit(&training_set()).unwrap();

    let mut records = training_set();
    records.push(customer(0.0, "Three year", 0.0));
    records.push(customer(1000.0, "", 1e6));

    let matrix = state.transform(&records).unwrap();
    assert_eq!(matrix.nrows(), records.len());
    assert_eq!(matrix.ncols(), state.output_width());
}

#[test]
fn test_scaled_training_columns_are_standardised() {
    let (_, matrix) = Preprocessor::new(schema()).fit_transform(&training_set()).unwrap();

    for column in 0..2 {
        let values = matrix.column(column);
        let n = values.len() as f64;
        let mean = values.sum() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_constant_column_transforms_to_zero() {
    let records: Vec<RawRecord> =
        (0..4).map(|i| customer(12.0, "One year", 20.0 + i as f64)).collect();

    let state = Preprocessor::new(schema()).fit(&records).unwrap();
    assert_eq!(state.numeric()[0].std, 0.0);

    let row = state.transform_one(&customer(99.0, "One year", 21.0)).unwrap();
    assert_eq!(row[0], 0.0);
    assert!(row.iter().all(|v| v.is_finite()));
}

#[test]
fn test_absent_column_is_schema_mismatch() {
    let records: Vec<RawRecord> = training_set()
        .into_iter()
        .map(|mut r| {
            r.remove("MonthlyCharges");
            r
        })
        .collect();

    match Preprocessor::new(schema()).fit(&records) {
        Err(ChurnError::SchemaMismatch(msg)) => assert!(msg.contains("MonthlyCharges")),
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_undeclared_columns_are_ignored() {
    let records: Vec<RawRecord> = training_set()
        .into_iter()
        .map(|r| r.with("PaymentMethod", "Electronic check"))
        .collect();

    let state = Preprocessor::new(schema()).fit(&records).unwrap();
    assert_eq!(state.output_width(), 4);
    assert!(state.encoding("PaymentMethod").is_none());
}

#[test]
fn test_inference_record_missing_column_is_rejected() {
    let state = Preprocessor::new(schema()).fit(&training_set()).unwrap();
    let mut record = customer(5.0, "One year", 10.0);
    record.remove("tenure");

    assert!(matches!(
        state.transform_one(&record),
        Err(ChurnError::SchemaMismatch(_))
    ));
}

#[test]
fn test_non_numeric_value_in_numeric_column() {
    let state = Preprocessor::new(schema()).fit(&training_set()).unwrap();
    let record = customer(5.0, "One year", 10.0).with("tenure", "five");

    assert!(matches!(
        state.transform_one(&record),
        Err(ChurnError::SchemaMismatch(_))
    ));
}

#[test]
fn test_refit_produces_new_version() {
    let preprocessor = Preprocessor::new(schema());
    let first = preprocessor.fit(&training_set()).unwrap();
    let second = Preprocessor::fitted(first.clone()).fit(&training_set()).unwrap();

    assert_ne!(first.run_id(), second.run_id());
    assert_eq!(first.layout_hash(), second.layout_hash());
    assert_eq!(first.numeric(), second.numeric());
}

#[test]
fn test_keep_all_categories() {
    let options = PreprocessorOptions { drop: DropPolicy::None, ..Default::default() };
    let state = fit(&schema(), &training_set(), options).unwrap();

    assert_eq!(state.output_width(), 5);
    let row = state.transform_one(&customer(5.0, "Month-to-month", 50.0)).unwrap();
    assert_eq!(&row[2..], &[1.0, 0.0, 0.0]);
}

#[test]
fn test_fingerprint_survives_persistence() {
    let state = Preprocessor::new(schema()).fit(&training_set()).unwrap();
    let json = serde_json::to_string(&state).unwrap();
    let restored: super::FittedPreprocessorState = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, state);
    assert_eq!(restored.fingerprint().unwrap(), state.fingerprint().unwrap());
}
