//! Schema inference tests

use super::{ColumnKind, FeatureSchema, RawRecord};

fn customer(tenure: &str, contract: &str, charges: f64, churn: &str) -> RawRecord {
    RawRecord::new()
        .with("customerID", "7590-VHVEG")
        .with("tenure", tenure)
        .with("Contract", contract)
        .with("MonthlyCharges", charges)
        .with("Churn", churn)
}

#[test]
fn test_infer_kinds_and_order() {
    let records = vec![
        customer("1", "Month-to-month", 29.85, "No"),
        customer("34", "One year", 56.95, "Yes"),
    ];

    let schema = FeatureSchema::infer(&records, "Churn", &["customerID"]).unwrap();
    let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();

    // BTreeMap iteration is alphabetical within a record
    assert_eq!(names, vec!["Contract", "MonthlyCharges", "tenure"]);
    assert_eq!(schema.column("tenure").unwrap().kind, ColumnKind::Numeric);
    assert_eq!(schema.column("Contract").unwrap().kind, ColumnKind::Categorical);
    assert!(schema.column("customerID").is_none());
    assert!(schema.column("Churn").is_none());
}

#[test]
fn test_infer_blank_cells_do_not_force_categorical() {
    let records = vec![
        customer(" ", "Two year", 20.0, "No"),
        customer("12", "Two year", 25.0, "No"),
    ];

    let schema = FeatureSchema::infer(&records, "Churn", &[]).unwrap();
    assert_eq!(schema.column("tenure").unwrap().kind, ColumnKind::Numeric);
}

#[test]
fn test_infer_mixed_column_is_categorical() {
    let records = vec![
        customer("12", "Two year", 25.0, "No"),
        customer("unknown", "Two year", 25.0, "No"),
    ];

    let schema = FeatureSchema::infer(&records, "Churn", &[]).unwrap();
    assert_eq!(schema.column("tenure").unwrap().kind, ColumnKind::Categorical);
}

#[test]
fn test_infer_from_nothing_fails() {
    assert!(FeatureSchema::infer(&[], "Churn", &[]).is_err());
}
