//! Application error type mapping to HTTP status codes.
//!
//! Response bodies are the flat `{"error": "..."}` shape the site widget
//! and the automation peer already expect.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use livedesk_types::error::{RelayError, SignatureError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or incomplete inbound payload.
    Validation(String),
    /// Signature absent or invalid while a secret is configured.
    Unauthorized(String),
    /// Unexpected fault.
    Internal(String),
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::InvalidPayload(msg) => AppError::Validation(msg),
            RelayError::Channel(err) => AppError::Internal(err.to_string()),
            // Session resolution failures only occur on the operator
            // path, which is not HTTP-triggered; reaching here is a bug.
            RelayError::SessionNotFound(id) => {
                AppError::Internal(format!("session '{id}' not found"))
            }
        }
    }
}

impl From<SignatureError> for AppError {
    fn from(_: SignatureError) -> Self {
        AppError::Unauthorized("Invalid signature".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedesk_types::error::ChannelError;

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::Validation("Invalid data".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let response = AppError::from(SignatureError::Mismatch).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_signature_header_maps_to_401() {
        let response = AppError::from(SignatureError::MissingHeader).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_channel_failure_maps_to_500() {
        let err = AppError::from(RelayError::from(ChannelError::Transport(
            "connection refused".to_string(),
        )));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
