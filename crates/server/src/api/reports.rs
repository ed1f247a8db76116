//! Report API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct ReportErrorResponse {
    pub error: String,
}

/// Aggregate rule-failure counts across every stored report.
pub async fn summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(reports) = state.reports() else {
        return report_store_disabled();
    };

    match reports.aggregate() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!("Report aggregation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReportErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Delete every stored report.
pub async fn delete_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(reports) = state.reports() else {
        return report_store_disabled();
    };

    match reports.delete_all() {
        Ok(removed) => (StatusCode::OK, Json(json!({"deleted": removed}))).into_response(),
        Err(e) => {
            error!("Report deletion failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReportErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn report_store_disabled() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ReportErrorResponse {
            error: "report store is not enabled".to_string(),
        }),
    )
        .into_response()
}
