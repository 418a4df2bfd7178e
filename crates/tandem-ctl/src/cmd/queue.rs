//! Waiting queue command.

use anyhow::Result;
use serde::Deserialize;

use super::http::{base_url, get_json};

#[derive(Deserialize)]
struct QueueResponse {
    waiting: Vec<WaitingInfo>,
}

#[derive(Deserialize)]
struct WaitingInfo {
    conn_id: String,
    waited_secs: u64,
}

pub async fn cmd_queue(port: u16) -> Result<()> {
    let resp: QueueResponse = get_json(&format!("{}/queue", base_url(port))).await?;

    if resp.waiting.is_empty() {
        println!("Nobody is waiting.");
        return Ok(());
    }

    println!("Waiting ({}), oldest first:", resp.waiting.len());
    for (i, w) in resp.waiting.iter().enumerate() {
        println!("  {:>3}. {:<14} {}s", i + 1, w.conn_id, w.waited_secs);
    }

    Ok(())
}
