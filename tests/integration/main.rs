//! Tandem integration test harness.
//!
//! Every test starts its own signaling and admin listeners on ephemeral
//! loopback ports inside the test process and drives them with real WebSocket
//! clients. Tests share nothing, so they run in parallel.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use tandem_api::ApiState;
use tandem_core::config::TandemConfig;
use tandem_core::{ClientEvent, ServerEvent, SessionId};
use tandem_services::Switchboard;

mod admin;
mod failures;

/// How long to wait for an event that should arrive.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);
/// How long to listen for an event that should not arrive.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

// ── Server ────────────────────────────────────────────────────────────────────

pub struct TestServer {
    pub signaling: SocketAddr,
    pub admin: SocketAddr,
    pub switchboard: Switchboard,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(TandemConfig::default()).await
    }

    pub async fn start_with(mut config: TandemConfig) -> Result<Self> {
        config.relay.ping_interval_secs = 0;
        let switchboard = Switchboard::new();
        let state = ApiState::new(switchboard.clone(), &config);

        let signaling_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let admin_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let signaling = signaling_listener.local_addr()?;
        let admin = admin_listener.local_addr()?;

        let signaling_app = tandem_api::signaling_router(state.clone());
        let admin_app = tandem_api::admin_router(state);
        tokio::spawn(async move { axum::serve(signaling_listener, signaling_app).await });
        tokio::spawn(async move { axum::serve(admin_listener, admin_app).await });

        Ok(Self {
            signaling,
            admin,
            switchboard,
        })
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.signaling)
    }

    pub async fn client(&self) -> Result<Client> {
        let (stream, _) = tokio_tungstenite::connect_async(self.ws_url())
            .await
            .context("websocket connect failed")?;
        Ok(Client { stream })
    }

    pub async fn api_get(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("http://{}/api{}", self.admin, path);
        let resp = reqwest::get(&url).await.with_context(|| format!("GET {url}"))?;
        Ok(resp.json().await?)
    }

    pub async fn api_status(&self, path: &str) -> Result<u16> {
        let url = format!("http://{}/api{}", self.admin, path);
        Ok(reqwest::get(&url).await?.status().as_u16())
    }

    pub async fn api_delete(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("http://{}/api{}", self.admin, path);
        let resp = reqwest::Client::new()
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("DELETE {url}"))?;
        Ok(resp.json().await?)
    }

    /// Poll until the waiting queue holds exactly `n` connections.
    pub async fn wait_for_waiting(&self, n: usize) -> Result<()> {
        wait_for(|| async { self.switchboard.waiting().await.len() == n }).await
    }

    /// Poll until exactly `n` connections are registered.
    pub async fn wait_for_connections(&self, n: usize) -> Result<()> {
        wait_for(|| async { self.switchboard.registry().len() == n }).await
    }
}

/// Poll `cond` every 10ms until it holds or RECV_TIMEOUT passes.
pub async fn wait_for<F, Fut>(cond: F) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if cond().await {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    bail!("condition not met within {:?}", RECV_TIMEOUT)
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct Client {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Client {
    pub async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        self.send_raw(&json).await
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::text(text.to_string())).await?;
        Ok(())
    }

    pub async fn send_binary(&mut self, data: Vec<u8>) -> Result<()> {
        self.stream.send(Message::binary(data)).await?;
        Ok(())
    }

    /// Next server event, skipping control frames.
    pub async fn recv(&mut self) -> Result<ServerEvent> {
        match self.recv_within(RECV_TIMEOUT).await? {
            Some(event) => Ok(event),
            None => bail!("no event within {:?}", RECV_TIMEOUT),
        }
    }

    /// Assert nothing arrives for QUIET_PERIOD.
    pub async fn expect_silence(&mut self) -> Result<()> {
        match self.recv_within(QUIET_PERIOD).await? {
            None => Ok(()),
            Some(event) => bail!("unexpected event {event:?}"),
        }
    }

    async fn recv_within(&mut self, wait: Duration) -> Result<Option<ServerEvent>> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let frame = match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Err(_) => return Ok(None),
                Ok(None) => bail!("socket closed"),
                Ok(Some(frame)) => frame?,
            };
            match frame {
                Message::Text(text) => return Ok(Some(serde_json::from_str(text.as_str())?)),
                Message::Close(_) => bail!("socket closed by server"),
                _ => continue,
            }
        }
    }

    pub async fn request_pairing(&mut self) -> Result<()> {
        self.send(&ClientEvent::RequestPairing).await
    }

    pub async fn leave(&mut self) -> Result<()> {
        self.send(&ClientEvent::LeaveSession).await
    }

    /// Expect `matched` and return its session id.
    pub async fn expect_matched(&mut self) -> Result<SessionId> {
        match self.recv().await? {
            ServerEvent::Matched { session_id } => Ok(session_id),
            other => bail!("expected matched, got {other:?}"),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Pair two fresh clients. Returns (initiator, joiner, session id).
pub async fn paired(server: &TestServer) -> Result<(Client, Client, SessionId)> {
    let mut x = server.client().await?;
    let mut y = server.client().await?;

    x.request_pairing().await?;
    assert_eq!(x.recv().await?, ServerEvent::Waiting);
    y.request_pairing().await?;

    let sid = x.expect_matched().await?;
    assert_eq!(
        x.recv().await?,
        ServerEvent::InitiatorAssigned { is_initiator: true }
    );
    assert_eq!(y.expect_matched().await?, sid);
    Ok((x, y, sid))
}
