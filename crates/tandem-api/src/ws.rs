//! Signaling WebSocket — one socket per anonymous client.
//!
//! GET /ws

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use tandem_core::config::CorsConfig;
use tandem_core::{ClientEvent, ConnId, ServerEvent, SignalError};

use super::ApiState;

const TRANSPORT_CAP_FACTOR: usize = 16;
const MIN_MESSAGE_BYTES: usize = 1024;

pub async fn handle_upgrade(
    State(state): State<ApiState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if let Some(origin) = headers.get(header::ORIGIN) {
        if !origin_allowed(&state.cors, origin) {
            tracing::warn!(origin = ?origin, "rejected signaling upgrade from origin");
            return (StatusCode::FORBIDDEN, "origin not allowed").into_response();
        }
    }

    // Frames over the relay limit are rejected per message; the transport cap
    // only bounds what a single read may buffer.
    let hard_cap = transport_cap(state.relay.max_message_bytes);
    ws.max_message_size(hard_cap)
        .max_frame_size(hard_cap)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

fn transport_cap(max_message_bytes: usize) -> usize {
    max_message_bytes
        .max(MIN_MESSAGE_BYTES)
        .saturating_mul(TRANSPORT_CAP_FACTOR)
}

fn origin_allowed(cors: &CorsConfig, origin: &HeaderValue) -> bool {
    if cors.allows_any() {
        return true;
    }
    match origin.to_str() {
        Ok(origin) => cors.allowed_origins.iter().any(|o| o == origin),
        Err(_) => false,
    }
}

async fn handle_socket(socket: WebSocket, state: ApiState) {
    let (mut sender, mut receiver) = socket.split();

    let (outbox, mut events) = mpsc::channel::<ServerEvent>(state.relay.outbound_buffer.max(1));
    let conn = state.switchboard.connect(outbox);

    let ping_secs = state.relay.ping_interval_secs;
    let mut writer = tokio::spawn(async move {
        let period = Duration::from_secs(ping_secs.max(1));
        let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    let json = match serde_json::to_string(&event) {
                        Ok(j) => j,
                        Err(e) => {
                            tracing::warn!(conn = %conn, error = %e, "failed to serialize event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick(), if ping_secs > 0 => {
                    if sender.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let max = state.relay.max_message_bytes.max(MIN_MESSAGE_BYTES);
                    if text.len() > max {
                        reject(&state, conn, SignalError::Oversized { len: text.len(), max });
                    } else {
                        dispatch(&state, conn, text.as_str()).await;
                    }
                }
                Some(Ok(Message::Binary(_))) => {
                    reject(&state, conn, SignalError::UnsupportedFrame("binary"));
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!(conn = %conn, error = %e, "socket error");
                    break;
                }
            },
            // Writer stopped: the client can no longer hear us.
            _ = &mut writer => break,
        }
    }

    writer.abort();
    state.switchboard.disconnect(conn).await;
}

async fn dispatch(state: &ApiState, conn: ConnId, text: &str) {
    match ClientEvent::parse(text) {
        Ok(event) => {
            if let Err(e) = state.switchboard.handle(conn, event).await {
                log_dropped(conn, &e);
            }
        }
        Err(e) => reject(state, conn, e),
    }
}

fn reject(state: &ApiState, conn: ConnId, error: SignalError) {
    state.switchboard.record_dropped();
    log_dropped(conn, &error);
}

fn log_dropped(conn: ConnId, error: &SignalError) {
    tracing::warn!(
        conn = %conn,
        class = error.class().as_str(),
        error = %error,
        "event dropped"
    );
}
