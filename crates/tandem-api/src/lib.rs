pub mod handlers;
pub mod ws;

use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use tandem_core::config::CorsConfig;

pub use handlers::ApiState;

/// Public signaling router: the WebSocket endpoint plus a health probe.
pub fn signaling_router(state: ApiState) -> Router {
    let cors = cors_layer(&state.cors);
    Router::new()
        .route("/ws", get(ws::handle_upgrade))
        .route("/health", get(handlers::handle_health))
        .with_state(state)
        .layer(cors)
}

/// Admin router, meant for loopback only.
pub fn admin_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/status", get(handlers::handle_status))
        .route("/health", get(handlers::handle_health))
        .route("/sessions", get(handlers::handle_session_list))
        .route(
            "/sessions/{id}",
            get(handlers::handle_session_inspect).delete(handlers::handle_session_drop),
        )
        .route("/queue", get(handlers::handle_queue))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

pub async fn serve_signaling(state: ApiState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = signaling_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "signaling listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn serve_admin(state: ApiState, port: u16) -> anyhow::Result<()> {
    let app = admin_router(state);
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!(port, "admin API listening on 127.0.0.1");
    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    if config.allows_any() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
