//! Session management commands.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, delete_json, get_json};

#[derive(Deserialize)]
struct SessionInfo {
    session_id: String,
    initiator: String,
    joiner: String,
    age_secs: u64,
}

#[derive(Deserialize)]
struct SessionListResponse {
    sessions: Vec<SessionInfo>,
}

pub async fn cmd_session_list(port: u16) -> Result<()> {
    let resp: SessionListResponse = get_json(&format!("{}/sessions", base_url(port))).await?;

    if resp.sessions.is_empty() {
        println!("No active sessions.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Active Sessions ({})", resp.sessions.len());
    println!("═══════════════════════════════════════");
    for s in &resp.sessions {
        println!("  ┌─ {}", s.session_id);
        println!("  │  initiator : {}", s.initiator);
        println!("  │  joiner    : {}", s.joiner);
        println!("  └─ age       : {}s", s.age_secs);
    }

    Ok(())
}

pub async fn cmd_session_inspect(port: u16, session_id: &str) -> Result<()> {
    let resp: SessionInfo =
        get_json(&format!("{}/sessions/{}", base_url(port), session_id)).await?;

    println!("═══════════════════════════════════════");
    println!("  Session Details");
    println!("═══════════════════════════════════════");
    println!("  ID        : {}", resp.session_id);
    println!("  Initiator : {}", resp.initiator);
    println!("  Joiner    : {}", resp.joiner);
    println!("  Age       : {}s", resp.age_secs);

    Ok(())
}

pub async fn cmd_session_drop(port: u16, session_id: &str) -> Result<()> {
    #[derive(Deserialize)]
    struct DropResponse {
        session_id: String,
        dropped: bool,
    }

    let resp: DropResponse =
        delete_json(&format!("{}/sessions/{}", base_url(port), session_id)).await?;

    if resp.dropped {
        println!("✓ Session dropped: {}", resp.session_id);
    } else {
        println!("Session not found: {}", resp.session_id);
    }

    Ok(())
}
