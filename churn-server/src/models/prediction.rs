//! Prediction request/response models

use chrono::{DateTime, Utc};
use churn_core::{PredictionResult, RiskLevel};
use serde::{Deserialize, Serialize};

use super::CustomerFeatures;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub customers: Vec<CustomerFeatures>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPrediction {
    pub customer_index: usize,
    pub will_churn: bool,
    pub churn_probability: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<CustomerPrediction>,
    pub model_version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SinglePredictResponse {
    pub will_churn: bool,
    pub churn_probability: f64,
    pub risk_level: RiskLevel,
    pub model_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Probabilities go out rounded to 4 decimals.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

impl CustomerPrediction {
    pub fn new(customer_index: usize, result: &PredictionResult) -> Self {
        Self {
            customer_index,
            will_churn: result.will_churn,
            churn_probability: round4(result.churn_probability),
            risk_level: result.risk_level,
        }
    }
}

impl SinglePredictResponse {
    pub fn new(result: &PredictionResult, model_version: String) -> Self {
        Self {
            will_churn: result.will_churn,
            churn_probability: round4(result.churn_probability),
            risk_level: result.risk_level,
            model_version,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
        assert_eq!(round4(0.0), 0.0);
    }

    #[test]
    fn test_risk_from_unrounded_probability() {
        // 0.29996 rounds to 0.3 on the wire but stays low risk
        let result = PredictionResult {
            will_churn: false,
            churn_probability: 0.29996,
            risk_level: RiskLevel::from_probability(0.29996),
        };
        let prediction = CustomerPrediction::new(0, &result);
        assert_eq!(prediction.churn_probability, 0.3);
        assert_eq!(prediction.risk_level, RiskLevel::Low);
    }
}
