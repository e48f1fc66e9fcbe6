//! Chatwoot relay - forwards Chatwoot webhook events to browser sockets.
//!
//! The chat widget talks to Chatwoot's REST API directly; this crate is the
//! inbound half, pushing agent replies and status changes to every open
//! widget as they happen.
//!
//! ## Architecture
//!
//! ```text
//! Chatwoot → POST /webhook/chatwoot → verify → route → BroadcastHub → WebSocket clients
//! ```

pub mod config;
pub mod error;
pub mod relay;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::RelayError;
pub use relay::{BroadcastHub, Notification, WebhookEvent};
pub use web::AppState;
