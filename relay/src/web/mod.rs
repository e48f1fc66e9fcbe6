//! Web server module: the Chatwoot webhook, health check, and browser sockets.
//!
//! A single port serves:
//! - `POST /webhook/chatwoot`: verified webhook intake
//! - `GET /health`: liveness and connected-client count
//! - `GET /` and `GET /ws`: WebSocket upgrade for browser clients

pub mod handlers;
pub mod server;
pub mod signature;
pub mod socket;

pub use handlers::{
    chatwoot_webhook, health, not_found, panic_response, AppState, HealthResponse, WebhookAck,
};
pub use server::{build_router, routes, serve, serve_app, with_middleware, WEBHOOK_PATH};
pub use signature::{verify_chatwoot_signature, SignatureError, SIGNATURE_HEADER};
pub use socket::{handle_socket, ws_upgrade};
