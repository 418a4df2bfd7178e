use crate::*;
use serde_json::json;

/// Paired peer drops its transport: survivor hears once, goes idle, and a
/// late candidate for the old session is dropped silently.
#[tokio::test]
async fn test_peer_transport_loss() -> Result<()> {
    let server = TestServer::start().await?;
    let (mut x, y, sid) = paired(&server).await?;

    y.close().await?;
    assert_eq!(x.recv().await?, ServerEvent::PeerDisconnected);
    x.expect_silence().await?;
    server.wait_for_connections(1).await?;

    let status = server.api_get("/status").await?;
    assert_eq!(status["connections"]["idle"], 1);
    assert_eq!(status["sessions"], 0);

    x.send(&ClientEvent::NetworkCandidate { session_id: sid, candidate: json!({ "candidate": "" }) })
        .await?;
    x.expect_silence().await?;

    // The socket is still usable.
    x.request_pairing().await?;
    assert_eq!(x.recv().await?, ServerEvent::Waiting);
    Ok(())
}

/// Leaving mid-negotiation notifies the peer exactly once; leaving again is a no-op.
#[tokio::test]
async fn test_leave_mid_negotiation() -> Result<()> {
    let server = TestServer::start().await?;
    let (mut x, mut y, sid) = paired(&server).await?;

    x.send(&ClientEvent::NegotiationOffer { session_id: sid, offer: json!({ "sdp": "v=0" }) })
        .await?;
    assert!(matches!(y.recv().await?, ServerEvent::NegotiationOffer { .. }));

    y.leave().await?;
    y.leave().await?;
    assert_eq!(x.recv().await?, ServerEvent::PeerDisconnected);
    x.expect_silence().await?;
    y.expect_silence().await?;
    Ok(())
}

/// A waiter that disconnects is never offered to a later arrival.
#[tokio::test]
async fn test_disconnect_while_waiting() -> Result<()> {
    let server = TestServer::start().await?;
    let mut a = server.client().await?;
    a.request_pairing().await?;
    assert_eq!(a.recv().await?, ServerEvent::Waiting);

    a.close().await?;
    server.wait_for_waiting(0).await?;

    let mut b = server.client().await?;
    b.request_pairing().await?;
    assert_eq!(b.recv().await?, ServerEvent::Waiting);
    b.expect_silence().await?;
    Ok(())
}

/// Malformed input is dropped and never closes the socket.
#[tokio::test]
async fn test_malformed_input_is_survivable() -> Result<()> {
    let server = TestServer::start().await?;
    let mut a = server.client().await?;

    a.send_raw("not json").await?;
    a.send_raw(r#"{"type":"join-room"}"#).await?;
    a.send_raw(r#"{"type":"network-candidate","candidate":{}}"#).await?;
    a.send_raw(r#"{"type":"chat-message","sessionId":"xyz","text":"hi"}"#).await?;
    a.send_binary(vec![0xde, 0xad]).await?;
    a.expect_silence().await?;

    a.request_pairing().await?;
    assert_eq!(a.recv().await?, ServerEvent::Waiting);

    let status = server.api_get("/status").await?;
    assert_eq!(status["stats"]["events_dropped"], 5);
    Ok(())
}

/// A frame over the relay limit is dropped, and the socket stays open.
#[tokio::test]
async fn test_oversized_frame_is_dropped() -> Result<()> {
    let server = TestServer::start().await?;
    let (mut x, mut y, sid) = paired(&server).await?;

    let text = "a".repeat(70 * 1024);
    x.send(&ClientEvent::ChatMessage { session_id: sid, text }).await?;
    y.expect_silence().await?;

    x.send(&ClientEvent::ChatMessage { session_id: sid, text: "short".into() })
        .await?;
    assert_eq!(y.recv().await?, ServerEvent::ChatMessage { text: "short".into() });

    let status = server.api_get("/status").await?;
    assert_eq!(status["stats"]["events_dropped"], 1);
    Ok(())
}

/// Upgrades from an origin outside the allow-list are refused.
#[tokio::test]
async fn test_foreign_origin_rejected() -> Result<()> {
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;

    let server = TestServer::start().await?;

    let mut request = server.ws_url().into_client_request()?;
    request
        .headers_mut()
        .insert("Origin", "https://evil.example".parse()?);
    assert!(tokio_tungstenite::connect_async(request).await.is_err());

    let mut request = server.ws_url().into_client_request()?;
    request
        .headers_mut()
        .insert("Origin", "https://localhost:3000".parse()?);
    assert!(tokio_tungstenite::connect_async(request).await.is_ok());
    Ok(())
}
