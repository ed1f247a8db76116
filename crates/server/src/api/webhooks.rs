//! Webhook handlers.
//!
//! Both webhooks accept the raw JSON delivery and hand it to the workflow;
//! this layer only maps workflow outcomes and errors onto HTTP responses.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use expresso_core::report::ReportError;
use expresso_core::workflow::{WorkflowError, WorkflowOutcome};

use crate::state::AppState;

/// Entry webhook: the repository finished processing an asset.
pub async fn asset_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Response {
    match state.workflow().handle_asset_event(&body).await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => error_response(e),
    }
}

/// Completion webhook: the manifest service finished (or failed) a job.
pub async fn manifest_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Response {
    match state.workflow().handle_manifest_event(&body).await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => error_response(e),
    }
}

fn outcome_response(outcome: WorkflowOutcome) -> Response {
    match outcome {
        WorkflowOutcome::ChallengeEcho(challenge) => {
            (StatusCode::OK, Json(json!({"challenge": challenge}))).into_response()
        }
        WorkflowOutcome::Skipped { detail } => {
            (StatusCode::OK, Json(json!({"status": detail}))).into_response()
        }
        WorkflowOutcome::AssetTooLarge => {
            (StatusCode::NO_CONTENT, "asset too large for express").into_response()
        }
        WorkflowOutcome::Submitted { job_id, asset_path } => (
            StatusCode::OK,
            Json(json!({"jobId": job_id, "assetPath": asset_path})),
        )
            .into_response(),
        WorkflowOutcome::NoJobData => {
            (StatusCode::OK, Json(json!({"message": "No Job Data found"}))).into_response()
        }
        WorkflowOutcome::AlreadyComplete { job_id } => (
            StatusCode::OK,
            Json(json!({"status": "already processed", "jobId": job_id})),
        )
            .into_response(),
        WorkflowOutcome::StillRunning { job_id } => (
            StatusCode::OK,
            Json(json!({"status": "processing", "jobId": job_id})),
        )
            .into_response(),
        WorkflowOutcome::RetryScheduled { job_id, pass } => (
            StatusCode::OK,
            Json(json!({"status": "retry scheduled", "jobId": job_id, "pass": pass})),
        )
            .into_response(),
        WorkflowOutcome::RetryExhausted { job_id } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "retry attempts exhausted", "jobId": job_id})),
        )
            .into_response(),
        WorkflowOutcome::TerminalFailure { job_id, reason } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "manifest job failed", "jobId": job_id, "reason": reason})),
        )
            .into_response(),
        WorkflowOutcome::Completed { job_id, compatible } => (
            StatusCode::OK,
            Json(json!({
                "jobId": job_id,
                "status": if compatible { "ok" } else { "error" },
                "compatible": compatible
            })),
        )
            .into_response(),
    }
}

fn error_response(error: WorkflowError) -> Response {
    let status = match &error {
        WorkflowError::MissingRequiredInput { .. } | WorkflowError::MalformedEvent { .. } => {
            StatusCode::BAD_REQUEST
        }
        WorkflowError::Report(ReportError::InvalidManifest) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Webhook handling failed: {}", error);
    }
    (status, Json(json!({"error": error.to_string()}))).into_response()
}
