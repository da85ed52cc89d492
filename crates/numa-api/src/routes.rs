//! API routes.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// `/v1/*` — the Orchestrator-facing surface (spec §6).
pub fn v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(handlers::users::register))
        .route("/messages/voice", post(handlers::messages::voice_upload))
        .route("/messages/text", post(handlers::messages::text_message))
        .route("/transactions", get(handlers::transactions::list_transactions))
        .route("/transactions/:id/verify/document", post(handlers::verify::verify_document))
        .route("/transactions/:id/verify/manual", post(handlers::verify::manual_verify))
        .route("/summary/daily", get(handlers::transactions::daily_summary))
}

/// General, unauthenticated endpoints.
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ping", get(handlers::health::ping))
}
