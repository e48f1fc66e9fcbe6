//! Maps webhook events to client notifications.
//!
//! ```text
//! WebhookEvent → route() → Option<Notification>
//! ```

use tracing::{debug, info};

use super::event::{AgentMessage, Notification, StatusUpdate, WebhookEvent};

/// Produce zero or one notification for a validated event.
///
/// Customer (`incoming`) messages are dropped so a customer's own message is
/// never echoed back to the widget. Unknown events are logged and ignored.
pub fn route(event: &WebhookEvent, timestamp: &str) -> Option<Notification> {
    match event {
        WebhookEvent::MessageCreated(msg) if msg.is_outgoing() => {
            info!(
                conversation_id = ?msg.conversation_id,
                message_id = ?msg.id,
                "agent_message_routed"
            );
            Some(Notification::AgentMessage(AgentMessage {
                conversation_id: msg.conversation_id.clone(),
                content: msg.content.clone(),
                message_id: msg.id.clone(),
                timestamp: timestamp.to_string(),
            }))
        }
        WebhookEvent::MessageCreated(msg) => {
            debug!(
                message_type = ?msg.message_type,
                conversation_id = ?msg.conversation_id,
                "non_outgoing_message_ignored"
            );
            None
        }
        WebhookEvent::ConversationStatusChanged(change) => {
            info!(
                conversation_id = ?change.conversation_id,
                status = ?change.status,
                "status_update_routed"
            );
            Some(Notification::StatusUpdate(StatusUpdate {
                conversation_id: change.conversation_id.clone(),
                status: change.status.clone(),
                timestamp: timestamp.to_string(),
            }))
        }
        WebhookEvent::Unknown { event, .. } => {
            info!(event = %event, "webhook_event_unhandled");
            None
        }
    }
}
