//! Daemon status command.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct StatusResponse {
    uptime_secs: u64,
    connections: ConnectionCounts,
    sessions: usize,
    stats: Stats,
}

#[derive(Deserialize)]
struct ConnectionCounts {
    total: usize,
    idle: usize,
    waiting: usize,
    paired: usize,
}

#[derive(Deserialize)]
struct Stats {
    connections_accepted: u64,
    sessions_created: u64,
    messages_relayed: u64,
    events_dropped: u64,
}

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Tandem Daemon Status");
    println!("═══════════════════════════════════════");
    println!("  Uptime           : {}s", resp.uptime_secs);
    println!("  Connections      : {}", resp.connections.total);
    println!("    idle           : {}", resp.connections.idle);
    println!("    waiting        : {}", resp.connections.waiting);
    println!("    paired         : {}", resp.connections.paired);
    println!("  Active sessions  : {}", resp.sessions);
    println!();
    println!("  Accepted total   : {}", resp.stats.connections_accepted);
    println!("  Sessions total   : {}", resp.stats.sessions_created);
    println!("  Messages relayed : {}", resp.stats.messages_relayed);
    println!("  Events dropped   : {}", resp.stats.events_dropped);

    Ok(())
}
