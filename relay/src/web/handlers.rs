//! HTTP endpoint handlers.
//!
//! The webhook handler runs the whole pipeline inline:
//! 1. Verify the signature (if a secret is configured)
//! 2. Validate and classify the payload
//! 3. Broadcast the resulting notification, if any
//! 4. Acknowledge with 200
//!
//! Broadcast outcome never changes the response.

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::error::{ErrorBody, RelayError};
use crate::relay::event::relay_timestamp;
use crate::relay::{route, BroadcastHub, WebhookEvent};
use crate::web::signature::{verify_chatwoot_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub hub: BroadcastHub,
}

impl AppState {
    pub fn new(config: Config, hub: BroadcastHub) -> Self {
        Self {
            config: Arc::new(config),
            hub,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub ws_clients: usize,
    pub timestamp: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        ws_clients: state.hub.count().await,
        timestamp: relay_timestamp(),
        version: state.config.version.clone(),
    })
}

// =============================================================================
// Chatwoot Webhook
// =============================================================================

/// Webhook acknowledgment.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub event: String,
    pub timestamp: String,
}

/// Chatwoot webhook endpoint.
pub async fn chatwoot_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, RelayError> {
    let signature = headers.get(SIGNATURE_HEADER).map(|v| v.as_bytes());

    info!(
        body_length = body.len(),
        has_signature = signature.is_some(),
        "chatwoot_webhook_received"
    );

    verify_chatwoot_signature(state.config.webhook_secret.as_deref(), signature, &body)?;

    let event = WebhookEvent::from_slice(&body).inspect_err(|e| {
        info!(error = %e, "chatwoot_webhook_rejected");
    })?;

    let timestamp = relay_timestamp();

    if let Some(notification) = route(&event, &timestamp) {
        state
            .hub
            .broadcast(&notification)
            .await
            .map_err(|e| RelayError::Internal(format!("failed to encode notification: {}", e)))?;
    }

    Ok(Json(WebhookAck {
        success: true,
        event: event.name().to_string(),
        timestamp,
    }))
}

// =============================================================================
// Fallbacks
// =============================================================================

/// Unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

/// Last-resort response for a handler that panicked.
///
/// The server keeps running; only the offending request fails.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(message = %message, "handler_panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::with_message("Internal server error", message)),
    )
        .into_response()
}
