//! Error taxonomy for the webhook pipeline.
//!
//! Every variant maps to one HTTP status and a JSON body that always carries
//! a relay-generated timestamp.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::relay::event::relay_timestamp;
use crate::web::signature::SignatureError;

/// Errors surfaced to the webhook caller.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Body is not a `{ event, data }` object.
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Signature missing, wrong, or impossible to evaluate.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Anything else that went wrong while handling the request.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(error: &'static str) -> Self {
        Self {
            error,
            message: None,
            timestamp: relay_timestamp(),
        }
    }

    pub fn with_message(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(error)
        }
    }
}

impl RelayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            RelayError::Signature(SignatureError::Verification(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::Signature(_) => StatusCode::UNAUTHORIZED,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            RelayError::InvalidPayload(_) => ErrorBody::new("Invalid webhook payload"),
            RelayError::Signature(SignatureError::Missing) => {
                ErrorBody::new("No signature provided")
            }
            RelayError::Signature(SignatureError::Invalid) => ErrorBody::new("Invalid signature"),
            RelayError::Signature(SignatureError::Verification(_)) => {
                ErrorBody::new("Signature verification failed")
            }
            RelayError::Internal(message) => {
                ErrorBody::with_message("Internal server error", message.clone())
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "webhook_request_failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::InvalidPayload("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::from(SignatureError::Missing).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RelayError::from(SignatureError::Invalid).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RelayError::from(SignatureError::Verification("bad hex".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_body_carries_message() {
        let body = RelayError::Internal("boom".into()).body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["message"], "boom");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_unauthorized_body_has_no_message() {
        let body = RelayError::from(SignatureError::Missing).body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "No signature provided");
        assert!(json.get("message").is_none());
    }
}
