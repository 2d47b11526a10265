//! JSON Diagnosis Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use diagnosis::{Diagnosis, Symptoms};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::{record_outcome, AppState};

/// Response for the diagnosis endpoint
#[derive(Debug, Serialize)]
pub struct DiagnosisResponse {
    #[serde(flatten)]
    pub diagnosis: Diagnosis,
    pub message: String,
}

/// POST /api/v1/diagnosis
pub async fn post_diagnosis(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Symptoms>, JsonRejection>,
) -> Result<Json<DiagnosisResponse>, ApiError> {
    let result = diagnose(&state, body);
    match &result {
        Ok(response) => record_outcome("ok", Some(&response.diagnosis)),
        Err(e) if e.is_client_error() => record_outcome("invalid", None),
        Err(_) => record_outcome("error", None),
    }
    result.map(Json)
}

fn diagnose(state: &AppState, body: Result<Json<Symptoms>, JsonRejection>) -> Result<DiagnosisResponse, ApiError> {
    let Json(symptoms) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let symptoms = symptoms.validated(&state.validator)?;
    let diagnosis = state.pipeline.diagnose(&symptoms)?;

    info!(
        "API diagnosis: score={:.3} category={:?} fallback={}",
        diagnosis.score, diagnosis.category, diagnosis.used_fallback
    );

    Ok(DiagnosisResponse {
        message: diagnosis.message(),
        diagnosis,
    })
}
