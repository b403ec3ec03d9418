//! Prediction handlers
//!
//! Requests are validated in full before anything reaches the predictor.
//! Scoring runs on the blocking pool so a slow batch never stalls the runtime.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use churn_core::RawRecord;
use validator::Validate;

use crate::models::{
    CustomerFeatures, CustomerPrediction, PredictRequest, PredictResponse, SinglePredictResponse,
};
use crate::{AppError, AppResult, AppState};

/// Batch prediction: 1..=MAX_BATCH_SIZE customers.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(request) = payload?;

    let count = request.customers.len();
    if count == 0 || count > state.config.max_batch_size {
        return Err(AppError::ValidationError(format!(
            "customers must hold between 1 and {} entries, got {}",
            state.config.max_batch_size, count
        )));
    }

    for (index, customer) in request.customers.iter().enumerate() {
        customer.validate().map_err(|e| {
            AppError::ValidationError(format!("customers[{}]: {}", index, e))
        })?;
    }

    let records: Vec<RawRecord> = request.customers.iter().map(CustomerFeatures::to_record).collect();
    let predictor = state.predictor.clone();
    let results = tokio::task::spawn_blocking(move || predictor.predict_batch(&records)).await??;

    tracing::info!("Predicted {} customers", results.len());

    Ok(Json(PredictResponse {
        predictions: results
            .iter()
            .enumerate()
            .map(|(index, result)| CustomerPrediction::new(index, result))
            .collect(),
        model_version: state.predictor.model_version().unwrap_or_default(),
        timestamp: Utc::now(),
    }))
}

/// Single-customer convenience endpoint.
pub async fn predict_single(
    State(state): State<AppState>,
    payload: Result<Json<CustomerFeatures>, JsonRejection>,
) -> AppResult<Json<SinglePredictResponse>> {
    let Json(customer) = payload?;
    customer.validate()?;

    let record = customer.to_record();
    let predictor = state.predictor.clone();
    let result = tokio::task::spawn_blocking(move || predictor.predict_single(&record)).await??;

    tracing::info!(
        "Single prediction: churn={}, prob={:.4}",
        result.will_churn,
        result.churn_probability
    );

    Ok(Json(SinglePredictResponse::new(
        &result,
        state.predictor.model_version().unwrap_or_default(),
    )))
}
