//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use diagnosis::DiagnosisError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Shown for missing, empty or non-numeric input
pub const VALIDATION_MESSAGE: &str = "Error: Todos los campos deben ser números.";
/// Shown when the pipeline fails for any other reason
pub const FAILURE_MESSAGE: &str = "Error: No se pudo calcular el diagnóstico.";

/// Errors surfaced by the server
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed request body: {0}")]
    BadRequest(String),

    #[error("Diagnosis failed: {0}")]
    Diagnosis(DiagnosisError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid rate limit: per_second={per_second}, burst_size={burst_size}")]
    RateLimit { per_second: u64, burst_size: u32 },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Metrics exporter error: {0}")]
    Metrics(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DiagnosisError> for ApiError {
    fn from(err: DiagnosisError) -> Self {
        match err {
            DiagnosisError::Validation(e) => ApiError::Validation(e),
            other => ApiError::Diagnosis(other),
        }
    }
}

impl ApiError {
    /// Input problems are the caller's fault; everything else is ours
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Validation(_) | ApiError::BadRequest(_))
    }

    /// Fixed user-facing message
    pub fn user_message(&self) -> &'static str {
        if self.is_client_error() {
            VALIDATION_MESSAGE
        } else {
            FAILURE_MESSAGE
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            warn!("Rejected request: {}", self);
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            error!("Request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let field = match &self {
            ApiError::Validation(e) => Some(e.field()),
            _ => None,
        };

        let body = json!({
            "error": self.user_message(),
            "detail": self.to_string(),
            "field": field,
        });

        (status, Json(body)).into_response()
    }
}
