//! Router assembly and the serve loop.

use std::future::Future;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::relay::BroadcastHub;
use crate::web::{chatwoot_webhook, health, not_found, panic_response, ws_upgrade, AppState};
use crate::Config;

/// Path Chatwoot posts webhooks to.
pub const WEBHOOK_PATH: &str = "/webhook/chatwoot";

/// Routes served by the relay, before middleware and state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ws_upgrade))
        .route("/ws", get(ws_upgrade))
        .route("/health", get(health))
        .route(WEBHOOK_PATH, post(chatwoot_webhook))
        .fallback(not_found)
}

/// Wrap routes with panic recovery, CORS for `frontend_url`, and request tracing.
pub fn with_middleware(router: Router<AppState>, config: &Config) -> Result<Router<AppState>> {
    let origin = HeaderValue::from_str(&config.frontend_url)
        .with_context(|| format!("Invalid FRONTEND_URL: {}", config.frontend_url))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request());

    Ok(router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Result<Router> {
    Ok(with_middleware(routes(), &state.config)?.with_state(state))
}

/// Serve the relay until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let hub = state.hub.clone();
    let app = build_router(state)?;
    serve_app(listener, app, hub, shutdown).await
}

/// Serve an assembled router until `shutdown` completes.
///
/// Sockets are closed as soon as the signal fires, and again once the
/// listener has stopped, so a socket upgraded during shutdown is not left
/// registered. In-flight HTTP requests are allowed to finish.
pub async fn serve_app<F>(
    listener: TcpListener,
    app: Router,
    hub: BroadcastHub,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let signal_hub = hub.clone();

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("web_server_shutting_down");
            signal_hub.close_all().await;
        })
        .await
        .context("Server error");

    let late = hub.close_all().await;
    if late > 0 {
        info!(closed = late, "late_clients_closed");
    }

    result?;

    info!("web_server_shutdown_complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_router() {
        let state = AppState::new(Config::default(), BroadcastHub::new());
        assert!(build_router(state).is_ok());
    }

    #[test]
    fn test_build_router_rejects_bad_origin() {
        let config = Config {
            frontend_url: "http://bad\norigin".to_string(),
            ..Config::default()
        };
        let state = AppState::new(config, BroadcastHub::new());
        assert!(build_router(state).is_err());
    }

    #[tokio::test]
    async fn test_serve_app_closes_clients_after_listener_stops() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let state = AppState::new(Config::default(), BroadcastHub::new());
        let hub = state.hub.clone();
        let app = build_router(state).unwrap();

        let (_id, mut rx) = hub.register().await;
        serve_app(listener, app, hub.clone(), async {}).await.unwrap();

        assert_eq!(hub.count().await, 0);
        assert!(rx.recv().await.is_none());
    }
}
