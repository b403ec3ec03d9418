//! Churn Scoring Server
//!
//! HTTP front end over `churn_core::Predictor`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CHURN SERVER                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐ │
//! │  │  Router   │─▶│  Validation   │─▶│  Predictor          │ │
//! │  │  (Axum)   │  │  (validator)  │  │  (blocking pool)    │ │
//! │  └───────────┘  └───────────────┘  └──────────┬──────────┘ │
//! │                                               ▼            │
//! │                          ┌─────────────────────────────┐   │
//! │                          │ preprocessor.json +         │   │
//! │                          │ churn_model.json (one run)  │   │
//! │                          └─────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod error;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use churn_core::Predictor;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(&config);

    tracing::info!("Churn Server starting ({})...", config.environment);

    // Load the artifact pair once; a failure leaves the predictor Failed
    // and the server up so /health can report it
    let predictor = Predictor::new();
    if let Err(e) = predictor.load(&config.artifact_paths()) {
        tracing::error!("Model not loaded, predictions disabled: {}", e);
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    // Build application state
    let state = AppState {
        predictor: Arc::new(predictor),
        config: Arc::new(config),
    };

    // Build router
    let app = create_router(state);

    // Start server
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing(config: &config::Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "churn_server=debug,churn_core=info,tower_http=debug".into());

    // JSON lines in production, human-readable otherwise
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub config: Arc<config::Config>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/ready", get(handlers::health::ready))

        // Prediction
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/single", post(handlers::predict::predict_single))

        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
