use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use churn_core::artifact::ArtifactPair;
use churn_core::model::LinearParams;
use churn_core::{FeatureSchema, ModelArtifact, ModelParams, Predictor, Preprocessor, RawRecord};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::models::customer::example_json;
use crate::{create_router, AppState};

const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];

/// Customers whose churn is driven by contract and tenure.
fn training_records(n: usize) -> (Vec<RawRecord>, Vec<bool>) {
    let mut records = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);

    for i in 0..n {
        let mut body = example_json();
        let contract = CONTRACTS[i % 3];
        let tenure = ((i * 7) % 72) as i64;
        body["Contract"] = json!(contract);
        body["tenure"] = json!(tenure);
        body["gender"] = json!(if i % 2 == 0 { "Female" } else { "Male" });
        body["MonthlyCharges"] = json!(20.0 + ((i * 13) % 90) as f64);

        let customer: crate::models::CustomerFeatures = serde_json::from_value(body).unwrap();
        records.push(customer.to_record());
        labels.push(contract == "Month-to-month" && tenure < 30);
    }

    (records, labels)
}

fn ready_predictor() -> Predictor {
    let (records, labels) = training_records(150);
    let (state, x) = Preprocessor::new(FeatureSchema::telco()).fit_transform(&records).unwrap();
    let params = ModelParams::LogisticRegression(LinearParams::default());
    let model = ModelArtifact::fit(&params, x.view(), &labels, &state).unwrap();

    Predictor::from_pair(ArtifactPair::new(state, model).unwrap())
}

fn app(predictor: Predictor, config: Config) -> Router {
    create_router(AppState {
        predictor: Arc::new(predictor),
        config: Arc::new(config),
    })
}

fn ready_app() -> Router {
    app(ready_predictor(), Config::default())
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        tokio_test::assert_ok!(serde_json::from_slice(&bytes))
    };

    (status, value)
}

// ============================================================================
// HEALTH
// ============================================================================

#[tokio::test]
async fn test_root_banner() {
    let (status, body) = send(ready_app(), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Churn Prediction API");
}

#[tokio::test]
async fn test_health_reports_unloaded_predictor() {
    let (status, body) = send(app(Predictor::new(), Config::default()), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["predictor_state"], "unloaded");
}

#[tokio::test]
async fn test_health_reports_ready_predictor() {
    let (status, body) = send(ready_app(), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert!(body["model_version"].as_str().unwrap().starts_with("churn_model_v1-"));
}

#[tokio::test]
async fn test_readiness_gating() {
    let (status, _) = send(app(Predictor::new(), Config::default()), "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = send(ready_app(), "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_failed_predictor_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::new();
    let missing = churn_core::ArtifactPaths::in_dir(&dir.path().join("no-such-model-dir"));
    assert!(predictor.load(&missing).is_err());

    let app = app(predictor, Config::default());
    let (status, body) = send(app.clone(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predictor_state"], "failed");

    let (status, _) = send(app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// PREDICT
// ============================================================================

#[tokio::test]
async fn test_predict_unloaded_is_503() {
    let request = json!({ "customers": [example_json()] });
    let (status, body) =
        send(app(Predictor::new(), Config::default()), "POST", "/predict", Some(request)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
    assert!(body["error"].as_str().unwrap().contains("unloaded"));
}

#[tokio::test]
async fn test_predict_batch() {
    let mut loyal = example_json();
    loyal["Contract"] = json!("Two year");
    loyal["tenure"] = json!(60);

    let request = json!({ "customers": [example_json(), loyal] });
    let (status, body) = send(ready_app(), "POST", "/predict", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);

    for (index, prediction) in predictions.iter().enumerate() {
        assert_eq!(prediction["customer_index"], index);
        let p = prediction["churn_probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&p));
        assert_eq!(p, (p * 10_000.0).round() / 10_000.0);
        assert!(["low", "medium", "high"].contains(&prediction["risk_level"].as_str().unwrap()));
    }

    // Short-tenure month-to-month customer scores above the two-year one
    assert!(
        predictions[0]["churn_probability"].as_f64().unwrap()
            > predictions[1]["churn_probability"].as_f64().unwrap()
    );
    assert!(body["model_version"].as_str().unwrap().starts_with("churn_model_v1-"));
}

#[tokio::test]
async fn test_predict_single_matches_batch() {
    let app = ready_app();

    let (status, single) = send(app.clone(), "POST", "/predict/single", Some(example_json())).await;
    assert_eq!(status, StatusCode::OK);

    let request = json!({ "customers": [example_json()] });
    let (_, batch) = send(app, "POST", "/predict", Some(request)).await;

    assert_eq!(single["churn_probability"], batch["predictions"][0]["churn_probability"]);
    assert_eq!(single["will_churn"], batch["predictions"][0]["will_churn"]);
    assert_eq!(single["risk_level"], batch["predictions"][0]["risk_level"]);
}

#[tokio::test]
async fn test_unknown_category_still_predicts() {
    let mut customer = example_json();
    customer["Contract"] = json!("Three year");

    let (status, body) = send(ready_app(), "POST", "/predict/single", Some(customer)).await;
    assert_eq!(status, StatusCode::OK);
    let p = body["churn_probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&p));
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let (status, body) =
        send(ready_app(), "POST", "/predict", Some(json!({ "customers": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_batch_limit_from_config() {
    let config = Config { max_batch_size: 2, ..Config::default() };
    let request = json!({ "customers": [example_json(), example_json(), example_json()] });

    let (status, body) = send(app(ready_predictor(), config), "POST", "/predict", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("between 1 and 2"));
}

#[tokio::test]
async fn test_blank_category_rejected_before_model() {
    let mut customer = example_json();
    customer["PaymentMethod"] = json!("  ");

    // An unloaded predictor would answer 503; validation answers first
    let request = json!({ "customers": [example_json(), customer] });
    let (status, body) =
        send(app(Predictor::new(), Config::default()), "POST", "/predict", Some(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("customers[1]"));
}

#[tokio::test]
async fn test_missing_field_is_400() {
    let mut customer = example_json();
    customer.as_object_mut().unwrap().remove("tenure");

    let (status, body) = send(ready_app(), "POST", "/predict/single", Some(customer)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_out_of_range_single_is_400() {
    let mut customer = example_json();
    customer["SeniorCitizen"] = json!(3);

    let (status, _) = send(ready_app(), "POST", "/predict/single", Some(customer)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
