//! Symptom Diagnosis API Server
//!
//! HTML form and JSON API in front of the diagnosis pipeline.

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use data_validator::Validator;
use diagnosis::{Diagnosis, DiagnosisPipeline};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;

pub use crate::config::{AppConfig, LoggingConfig};
pub use crate::error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    pub pipeline: DiagnosisPipeline,
    pub validator: Validator,
    /// Prometheus handle, when the exporter is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: &AppConfig, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            pipeline: DiagnosisPipeline::new(config.engine.clone()),
            validator: Validator::default(),
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::form::show_form).post(routes::form::submit_form))
        .route("/api/v1/diagnosis", post(routes::diagnosis::post_diagnosis))
        .route("/api/v1/health", get(routes::health::health_handler))
        .route("/metrics", get(routes::health::metrics_handler))
        .with_state(state)
}

/// Router with tracing and, when enabled, per-IP rate limiting
pub fn build_app(config: &AppConfig, state: Arc<AppState>) -> Result<Router, ApiError> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let mut app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    if config.rate_limit.enabled {
        let governor = rate_limit::create_governor_config(&config.rate_limit)?;
        info!(
            "Rate limiting enabled: one request per {}s, burst {}",
            config.rate_limit.per_second, config.rate_limit.burst_size
        );
        app = app.layer(GovernorLayer { config: governor });
    }

    Ok(app)
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> Result<PrometheusHandle, ApiError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Metrics(e.to_string()))
}

/// Count one diagnosis request and record its score
pub(crate) fn record_outcome(outcome: &'static str, diagnosis: Option<&Diagnosis>) {
    let category = diagnosis
        .and_then(|d| d.category)
        .map(|c| c.as_str())
        .unwrap_or("none");
    metrics::counter!("diagnosis_requests_total", "outcome" => outcome, "category" => category).increment(1);

    if let Some(d) = diagnosis {
        metrics::histogram!("diagnosis_score").record(d.score);
        if d.used_fallback {
            metrics::counter!("diagnosis_fallback_total").increment(1);
        }
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.max_level())
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| ApiError::Logging(e.to_string()))
}

/// Run the server until it stops
pub async fn run_server(config: AppConfig) -> Result<(), ApiError> {
    let metrics = if config.metrics.enabled {
        Some(install_metrics()?)
    } else {
        None
    };

    let state = Arc::new(AppState::new(&config, metrics));
    let app = build_app(&config, state)?;

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
