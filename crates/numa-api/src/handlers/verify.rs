//! Verification handlers (spec §6 `verify_document` / `manual_verify`).

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::extractors::Owner;
use crate::state::AppState;
use numa_orchestrator::ResponseEnvelope;
use numa_types::TransactionId;

/// `POST /v1/transactions/{id}/verify/document` — multipart body carrying
/// one `document` field, handed to the FIM's document analyzer.
pub async fn verify_document(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let mut document: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() == Some("document") {
            document = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?
                    .to_vec(),
            );
        }
    }

    let document = document.ok_or_else(|| ApiError::bad_request("missing 'document' field"))?;
    let transaction_id = TransactionId::from(id);
    let envelope = state
        .orchestrator
        .verify_document(&owner, &transaction_id, &document)
        .await;
    Ok(Json(envelope))
}

/// `POST /v1/transactions/{id}/verify/manual`.
pub async fn manual_verify(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Json<ResponseEnvelope> {
    let transaction_id = TransactionId::from(id);
    let envelope = state.orchestrator.manual_verify(&owner, &transaction_id).await;
    Json(envelope)
}
