//! /queue handler — who is waiting, oldest first.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiState;

#[derive(Serialize)]
pub struct QueueResponse {
    pub waiting: Vec<WaitingInfo>,
}

#[derive(Serialize)]
pub struct WaitingInfo {
    pub conn_id: String,
    pub waited_secs: u64,
}

pub async fn handle_queue(State(state): State<ApiState>) -> Json<QueueResponse> {
    let waiting = state
        .switchboard
        .waiting()
        .await
        .into_iter()
        .map(|(conn, waited)| WaitingInfo {
            conn_id: conn.to_string(),
            waited_secs: waited.as_secs(),
        })
        .collect();

    Json(QueueResponse { waiting })
}
