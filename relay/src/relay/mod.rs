//! Relay core: event model, routing, and broadcast fan-out.
//!
//! ## Flow
//!
//! ```text
//! raw body → WebhookEvent::from_slice() → route() → BroadcastHub::broadcast()
//! ```

pub mod broadcast;
pub mod event;
pub mod router;

pub use broadcast::{BroadcastHub, BroadcastReport, ClientId, ClientSink, SinkError};
pub use event::{Notification, WebhookEvent};
pub use router::route;
