//! /sessions handlers — session inspection and management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use tandem_services::Session;

use super::{parse_session_id, ApiState};

#[derive(Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub initiator: String,
    pub joiner: String,
    pub age_secs: u64,
}

impl From<&Session> for SessionInfo {
    fn from(s: &Session) -> Self {
        Self {
            session_id: s.id.to_string(),
            initiator: s.initiator.to_string(),
            joiner: s.joiner.to_string(),
            age_secs: s.created_at.elapsed().as_secs(),
        }
    }
}

// ── /sessions ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
}

pub async fn handle_session_list(State(state): State<ApiState>) -> Json<SessionListResponse> {
    let mut sessions = state.switchboard.sessions();
    sessions.sort_by_key(|s| s.created_at);
    Json(SessionListResponse {
        sessions: sessions.iter().map(SessionInfo::from).collect(),
    })
}

// ── /sessions/:id (GET) ───────────────────────────────────────────────────────

pub async fn handle_session_inspect(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, (StatusCode, String)> {
    let id = parse_session_id(&session_id)?;

    let session = state
        .switchboard
        .session(&id)
        .ok_or((StatusCode::NOT_FOUND, "session not found".to_string()))?;

    Ok(Json(SessionInfo::from(&session)))
}

// ── /sessions/:id (DELETE) ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionDropResponse {
    pub session_id: String,
    pub dropped: bool,
}

pub async fn handle_session_drop(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDropResponse>, (StatusCode, String)> {
    let id = parse_session_id(&session_id)?;
    let dropped = state.switchboard.drop_session(id).await.is_some();

    if dropped {
        tracing::info!(session = %id, "session dropped via API");
    }

    Ok(Json(SessionDropResponse {
        session_id: id.to_string(),
        dropped,
    }))
}
