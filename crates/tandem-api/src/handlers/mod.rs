//! HTTP API handlers — exposes switchboard state as JSON.

pub mod queue;
pub mod sessions;
pub mod status;

use std::time::Instant;

use axum::http::StatusCode;

use tandem_core::config::{CorsConfig, RelayConfig, TandemConfig};
use tandem_core::SessionId;
use tandem_services::Switchboard;

#[derive(Clone)]
pub struct ApiState {
    pub switchboard: Switchboard,
    pub cors: CorsConfig,
    pub relay: RelayConfig,
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(switchboard: Switchboard, config: &TandemConfig) -> Self {
        Self {
            switchboard,
            cors: config.cors.clone(),
            relay: config.relay.clone(),
            started_at: Instant::now(),
        }
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Parse a hex-encoded session ID.
fn parse_session_id(hex_str: &str) -> Result<SessionId, (StatusCode, String)> {
    hex_str
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid session id".to_string()))
}

// Re-export handler functions for use in router setup.
pub use queue::handle_queue;
pub use sessions::{handle_session_drop, handle_session_inspect, handle_session_list};
pub use status::{handle_health, handle_status};
