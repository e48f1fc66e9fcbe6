//! Inbound webhook events and outbound client notifications.
//!
//! Chatwoot posts `{ "event": ..., "data": { ... } }`. Only two event shapes are
//! understood; everything else is kept as [`WebhookEvent::Unknown`] so that
//! routing stays exhaustive.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RelayError;

/// Chatwoot event name for a newly created message.
pub const MESSAGE_CREATED: &str = "message_created";

/// Chatwoot event name for a conversation status change.
pub const CONVERSATION_STATUS_CHANGED: &str = "conversation_status_changed";

/// `message_type` value for messages written by an agent or bot.
pub const OUTGOING: &str = "outgoing";

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
pub fn relay_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// Inbound
// =============================================================================

/// A validated webhook payload.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    MessageCreated(MessageCreated),
    ConversationStatusChanged(StatusChanged),
    /// Any event type the relay does not act on.
    Unknown { event: String, data: Value },
}

/// `data` of a `message_created` event.
///
/// Identifiers and content are opaque and forwarded untouched. `None` means
/// the field was absent upstream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageCreated {
    pub message_type: Option<String>,
    pub conversation_id: Option<Value>,
    pub content: Option<Value>,
    pub id: Option<Value>,
}

impl MessageCreated {
    /// True for messages sent by an agent or bot rather than the customer.
    pub fn is_outgoing(&self) -> bool {
        self.message_type.as_deref() == Some(OUTGOING)
    }
}

/// `data` of a `conversation_status_changed` event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusChanged {
    pub conversation_id: Option<Value>,
    pub status: Option<Value>,
}

impl WebhookEvent {
    /// Parse and validate a raw request body.
    ///
    /// The body must be a JSON object with a non-empty string `event` and an
    /// object `data`. Nothing else is validated.
    pub fn from_slice(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RelayError::InvalidPayload(format!("malformed JSON: {}", e)))?;

        let Value::Object(mut root) = value else {
            return Err(RelayError::InvalidPayload(
                "body is not a JSON object".to_string(),
            ));
        };

        let event = match root.remove("event") {
            Some(Value::String(event)) if !event.is_empty() => event,
            _ => return Err(RelayError::InvalidPayload("missing event".to_string())),
        };

        let data = match root.remove("data") {
            Some(Value::Object(data)) => data,
            _ => return Err(RelayError::InvalidPayload("missing data".to_string())),
        };

        Ok(Self::from_parts(event, data))
    }

    fn from_parts(event: String, mut data: Map<String, Value>) -> Self {
        match event.as_str() {
            MESSAGE_CREATED => WebhookEvent::MessageCreated(MessageCreated {
                message_type: data
                    .get("message_type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                conversation_id: data.remove("conversation_id"),
                content: data.remove("content"),
                id: data.remove("id"),
            }),
            CONVERSATION_STATUS_CHANGED => WebhookEvent::ConversationStatusChanged(StatusChanged {
                conversation_id: data.remove("conversation_id"),
                status: data.remove("status"),
            }),
            _ => WebhookEvent::Unknown {
                event,
                data: Value::Object(data),
            },
        }
    }

    /// The upstream event name, echoed back in the acknowledgment.
    pub fn name(&self) -> &str {
        match self {
            WebhookEvent::MessageCreated(_) => MESSAGE_CREATED,
            WebhookEvent::ConversationStatusChanged(_) => CONVERSATION_STATUS_CHANGED,
            WebhookEvent::Unknown { event, .. } => event,
        }
    }
}

// =============================================================================
// Outbound
// =============================================================================

/// Message pushed to every connected browser socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    AgentMessage(AgentMessage),
    StatusUpdate(StatusUpdate),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Value>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    pub timestamp: String,
}

impl Notification {
    /// Tag used on the wire, handy for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::AgentMessage(_) => "agent_message",
            Notification::StatusUpdate(_) => "status_update",
        }
    }
}
