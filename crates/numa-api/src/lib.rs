//! Numa API - thin HTTP façade over the Orchestrator
//!
//! Owns routing, request/response translation, and the owner-identity
//! extractor. Everything domain-specific — classification, the ledger
//! state machine, zero-hallucination validation — lives behind
//! `numa_orchestrator::Orchestrator` and is out of scope here (spec §1).

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use state::{ApiConfig, AppState};

/// Build the full router over a shared [`AppState`].
pub fn create_router(state: Arc<AppState>, api_config: ApiConfig) -> Router {
    let mut router = Router::new()
        .nest("/v1", routes::v1_routes())
        .merge(routes::health_routes());

    if api_config.enable_cors {
        router = router.layer(build_cors_layer(&api_config.cors_origins));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(tower_http::cors::Any);
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}
