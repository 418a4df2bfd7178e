//! /status and /health handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tandem_services::StatsSnapshot;

use super::ApiState;

// ── /status ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_secs: u64,
    pub connections: ConnectionCounts,
    pub sessions: usize,
    pub stats: StatsSnapshot,
}

#[derive(Serialize)]
pub struct ConnectionCounts {
    pub total: usize,
    pub idle: usize,
    pub waiting: usize,
    pub paired: usize,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let registry = state.switchboard.registry();
    let (idle, waiting, paired) = registry.counts();

    Json(StatusResponse {
        uptime_secs: state.started_at.elapsed().as_secs(),
        connections: ConnectionCounts {
            total: registry.len(),
            idle,
            waiting,
            paired,
        },
        sessions: state.switchboard.session_count(),
        stats: state.switchboard.stats(),
    })
}

// ── /health ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
