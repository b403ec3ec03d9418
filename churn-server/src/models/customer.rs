//! Customer request model

use churn_core::RawRecord;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Field cannot be empty".into());
        return Err(error);
    }
    Ok(())
}

/// One customer as sent by clients. Wire names follow the dataset columns.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerFeatures {
    // Demographics
    #[serde(rename = "gender")]
    #[validate(custom(function = "not_blank"))]
    pub gender: String,
    #[validate(range(min = 0, max = 1))]
    pub senior_citizen: i64,
    #[validate(custom(function = "not_blank"))]
    pub partner: String,
    #[validate(custom(function = "not_blank"))]
    pub dependents: String,

    // Services
    #[serde(rename = "tenure")]
    #[validate(range(min = 0))]
    pub tenure: i64,
    #[validate(custom(function = "not_blank"))]
    pub phone_service: String,
    #[validate(custom(function = "not_blank"))]
    pub multiple_lines: String,
    #[validate(custom(function = "not_blank"))]
    pub internet_service: String,
    #[validate(custom(function = "not_blank"))]
    pub online_security: String,
    #[validate(custom(function = "not_blank"))]
    pub online_backup: String,
    #[validate(custom(function = "not_blank"))]
    pub device_protection: String,
    #[validate(custom(function = "not_blank"))]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    #[validate(custom(function = "not_blank"))]
    pub streaming_tv: String,
    #[validate(custom(function = "not_blank"))]
    pub streaming_movies: String,

    // Contract
    #[validate(custom(function = "not_blank"))]
    pub contract: String,
    #[validate(custom(function = "not_blank"))]
    pub paperless_billing: String,
    #[validate(custom(function = "not_blank"))]
    pub payment_method: String,
    #[validate(range(min = 0.0))]
    pub monthly_charges: f64,
    #[validate(range(min = 0.0))]
    pub total_charges: f64,
}

impl CustomerFeatures {
    /// Raw record keyed by dataset column names.
    pub fn to_record(&self) -> RawRecord {
        RawRecord::new()
            .with("gender", self.gender.as_str())
            .with("SeniorCitizen", self.senior_citizen)
            .with("Partner", self.partner.as_str())
            .with("Dependents", self.dependents.as_str())
            .with("tenure", self.tenure)
            .with("PhoneService", self.phone_service.as_str())
            .with("MultipleLines", self.multiple_lines.as_str())
            .with("InternetService", self.internet_service.as_str())
            .with("OnlineSecurity", self.online_security.as_str())
            .with("OnlineBackup", self.online_backup.as_str())
            .with("DeviceProtection", self.device_protection.as_str())
            .with("TechSupport", self.tech_support.as_str())
            .with("StreamingTV", self.streaming_tv.as_str())
            .with("StreamingMovies", self.streaming_movies.as_str())
            .with("Contract", self.contract.as_str())
            .with("PaperlessBilling", self.paperless_billing.as_str())
            .with("PaymentMethod", self.payment_method.as_str())
            .with("MonthlyCharges", self.monthly_charges)
            .with("TotalCharges", self.total_charges)
    }
}

/// The example customer from the API docs.
#[cfg(test)]
pub(crate) fn example_json() -> serde_json::Value {
    serde_json::json!({
        "gender": "Female",
        "SeniorCitizen": 0,
        "Partner": "Yes",
        "Dependents": "No",
        "tenure": 12,
        "PhoneService": "Yes",
        "MultipleLines": "No",
        "InternetService": "Fiber optic",
        "OnlineSecurity": "No",
        "OnlineBackup": "Yes",
        "DeviceProtection": "No",
        "TechSupport": "No",
        "StreamingTV": "Yes",
        "StreamingMovies": "No",
        "Contract": "Month-to-month",
        "PaperlessBilling": "Yes",
        "PaymentMethod": "Electronic check",
        "MonthlyCharges": 70.35,
        "TotalCharges": 840.20
    })
}
