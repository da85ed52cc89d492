//! User registration.
//!
//! Out of spec scope (credential verification is the façade's concern,
//! spec §6 `auth.secret`) but required for there to be an owner for the
//! other endpoints to act on.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::dto::RegisterRequest;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub owner_id: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if body.credential_hash.trim().is_empty() {
        return Err(ApiError::bad_request("credential_hash must not be empty"));
    }
    let user = state.orchestrator.register_user(body.credential_hash).await;
    Ok(Json(RegisterResponse {
        owner_id: user.id.to_string(),
    }))
}
