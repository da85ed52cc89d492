//! Request extractors.
//!
//! Credential verification (spec §6 `auth.secret`) is the façade's concern
//! and out of scope here; this extractor only resolves *which* owner a
//! request claims to act as, from a header a real deployment's auth
//! middleware would set after verifying a token.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use numa_types::UserId;

use crate::error::ApiError;

pub const OWNER_HEADER: &str = "x-numa-owner";

/// The owner a request is acting as.
pub struct Owner(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| Owner(UserId::from(s.to_string())))
            .ok_or_else(|| {
                ApiError::unauthorized(format!("missing {OWNER_HEADER} header")).into_response()
            })
    }
}
