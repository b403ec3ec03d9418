//! Deterministic telco-shaped records for unit tests.

use crate::artifact::ArtifactPair;
use crate::features::{FeatureSchema, RawRecord};
use crate::model::{ModelArtifact, ModelParams, LinearParams};
use crate::preprocess::Preprocessor;

const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];
const PAYMENTS: [&str; 4] = [
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];
const INTERNET: [&str; 3] = ["DSL", "Fiber optic", "No"];

/// Customer `i`. Month-to-month customers with short tenure churn.
pub fn telco_customer(i: usize) -> RawRecord {
    let contract = CONTRACTS[i % 3];
    let tenure = ((i * 7) % 72) as f64;
    let monthly = 20.0 + ((i * 13) % 90) as f64 + 0.35;
    let churn = contract == "Month-to-month" && tenure < 30.0;
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

    RawRecord::new()
        .with("customerID", format!("{:04}-TEST", i))
        .with("gender", if i % 2 == 0 { "Female" } else { "Male" })
        .with("SeniorCitizen", (i % 5 == 0) as i64)
        .with("Partner", yes_no(i % 3 == 1))
        .with("Dependents", yes_no(i % 4 == 1))
        .with("tenure", tenure)
        .with("PhoneService", yes_no(i % 6 != 0))
        .with("MultipleLines", yes_no(i % 2 == 1))
        .with("InternetService", INTERNET[i % 3])
        .with("OnlineSecurity", yes_no(i % 3 == 2))
        .with("OnlineBackup", yes_no(i % 4 == 0))
        .with("DeviceProtection", yes_no(i % 5 == 1))
        .with("TechSupport", yes_no(i % 3 == 0))
        .with("StreamingTV", yes_no(i % 2 == 0))
        .with("StreamingMovies", yes_no(i % 7 < 3))
        .with("Contract", contract)
        .with("PaperlessBilling", yes_no(i % 3 != 2))
        .with("PaymentMethod", PAYMENTS[i % 4])
        .with("MonthlyCharges", monthly)
        .with("TotalCharges", monthly * tenure.max(1.0))
        .with("Churn", yes_no(churn))
}

pub fn telco_records(n: usize) -> Vec<RawRecord> {
    (0..n).map(telco_customer).collect()
}

pub fn labels(records: &[RawRecord]) -> Vec<bool> {
    records
        .iter()
        .map(|r| r.get("Churn").map(|v| v.as_category() == "Yes").unwrap_or(false))
        .collect()
}

/// Preprocessor and logistic regression fitted on 120 customers.
pub fn fitted_pair() -> ArtifactPair {
    let records = telco_records(120);
    let y = labels(&records);

    let (state, x) = Preprocessor::new(FeatureSchema::telco())
        .fit_transform(&records)
        .unwrap();
    let params = ModelParams::LogisticRegression(LinearParams::default());
    let model = ModelArtifact::fit(&params, x.view(), &y, &state).unwrap();

    ArtifactPair::new(state, model).unwrap()
}
