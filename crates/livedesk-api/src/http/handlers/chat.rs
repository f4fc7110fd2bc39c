//! Chat relay handlers: site messages, automation callbacks, and the
//! polling endpoint.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use livedesk_infra::signature;
use livedesk_types::chat::{AutomationReply, SiteEvent};
use livedesk_types::error::SignatureError;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /api/chat-message - Site to operator: chat message or call
/// request, discriminated by payload shape. A shape matching neither is
/// a 400 with no state change.
pub async fn chat_message(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let event: SiteEvent = serde_json::from_value(payload)
        .map_err(|_| AppError::Validation("Invalid data".to_string()))?;

    state.relay.handle_site_event(event).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/chat-reply - Automation peer callback.
///
/// The body is taken raw so the signature check covers the exact bytes
/// received; JSON parsing happens only after verification passes. With
/// no secret configured the endpoint runs unauthenticated by
/// configuration choice.
pub async fn chat_reply(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    if let Some(secret) = &state.webhook_secret {
        let header = headers
            .get(signature::SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(SignatureError::MissingHeader)?;
        signature::verify(secret.as_bytes(), &body, header)?;
    }

    let reply: AutomationReply = serde_json::from_slice(&body)
        .map_err(|_| AppError::Validation("Missing sessionId/text".to_string()))?;
    if reply.session_id.is_empty() || reply.text.is_empty() {
        return Err(AppError::Validation("Missing sessionId/text".to_string()));
    }

    state.relay.handle_automation_reply(&reply.session_id, &reply.text);
    Ok(Json(json!({ "success": true })))
}

/// GET /api/chat-replies/{sessionId} - Site polls pending replies.
///
/// Never errors: unknown sessions yield an empty array. Drained batches
/// are gone for good; there is no redelivery.
pub async fn chat_replies(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    let messages = state.relay.drain_replies(&session_id);
    Json(json!({ "messages": messages }))
}
