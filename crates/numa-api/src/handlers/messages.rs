//! Voice and text message handlers (spec §6 `voice_upload` / `text_message`).

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::dto::TextMessageRequest;
use crate::error::ApiError;
use crate::extractors::Owner;
use crate::state::AppState;
use numa_orchestrator::ResponseEnvelope;

/// `POST /v1/messages/voice` — multipart body carrying one `audio` field.
/// The audio container is opaque to the core (spec §6): whatever bytes the
/// client sends are handed straight to the Orchestrator.
pub async fn voice_upload(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    mut multipart: Multipart,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() == Some("audio") {
            audio = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?
                    .to_vec(),
            );
        }
    }

    let audio = audio.ok_or_else(|| ApiError::bad_request("missing 'audio' field"))?;
    let envelope = state.orchestrator.handle_voice(&owner, &audio).await;
    Ok(Json(envelope))
}

/// `POST /v1/messages/text`.
pub async fn text_message(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(body): Json<TextMessageRequest>,
) -> Json<ResponseEnvelope> {
    let envelope = state.orchestrator.handle_text(&owner, &body.text).await;
    Json(envelope)
}
