//! tandemd — Tandem signaling daemon.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use tandem_api::ApiState;
use tandem_core::config::TandemConfig;
use tandem_services::Switchboard;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = TandemConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = TandemConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        TandemConfig::default()
    });

    let addr: SocketAddr = format!("{}:{}", config.network.bind_addr, config.network.port)
        .parse()
        .context("invalid signaling bind address")?;
    tracing::info!(
        %addr,
        api_port = config.network.api_port,
        origins = ?config.cors.allowed_origins,
        "tandemd starting"
    );

    // Shared state
    let switchboard = Switchboard::new();
    let state = ApiState::new(switchboard.clone(), &config);

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let signaling_task = tokio::spawn(tandem_api::serve_signaling(state.clone(), addr));
    let admin_task = tokio::spawn(tandem_api::serve_admin(state, config.network.api_port));

    let snapshot_printer = {
        let switchboard = switchboard.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                let (idle, waiting, paired) = switchboard.registry().counts();
                let stats = switchboard.stats();
                tracing::info!(
                    idle,
                    waiting,
                    paired,
                    sessions = switchboard.session_count(),
                    relayed = stats.messages_relayed,
                    dropped = stats.events_dropped,
                    "switchboard snapshot"
                );
            }
        })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv()  => tracing::info!("shutting down"),
        r = signaling_task      => tracing::error!("signaling server exited: {:?}", r),
        r = admin_task          => tracing::error!("admin API exited: {:?}", r),
        r = snapshot_printer    => tracing::error!("snapshot printer exited: {:?}", r),
    }

    Ok(())
}
