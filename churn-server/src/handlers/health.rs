//! Liveness and readiness handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use churn_core::PredictorStatus;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct ServiceInfo {
    message: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    predictor_state: PredictorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_version: Option<String>,
    timestamp: DateTime<Utc>,
    version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    status: PredictorStatus,
    timestamp: DateTime<Utc>,
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Churn Prediction API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness: 200 for as long as the process serves requests.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let predictor_state = state.predictor.status();
    let model_loaded = predictor_state == PredictorStatus::Ready;

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" },
        model_loaded,
        predictor_state,
        model_version: state.predictor.model_version(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness: 200 only once the predictor is `Ready`.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let status = state.predictor.status();
    let code = if status == PredictorStatus::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(ReadyResponse { status, timestamp: Utc::now() }))
}
