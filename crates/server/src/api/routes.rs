use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, reports, webhooks};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Reports
        .route("/reports/summary", get(reports::summary))
        .route("/reports", delete(reports::delete_all));

    Router::new()
        // Webhook deliveries from the event gateway
        .route("/webhooks/asset-event", post(webhooks::asset_event))
        .route("/webhooks/manifest-event", post(webhooks::manifest_event))
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
