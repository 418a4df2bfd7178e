use crate::*;

#[tokio::test]
async fn test_health_and_status_shape() -> Result<()> {
    let server = TestServer::start().await?;
    let _a = server.client().await?;
    server.wait_for_connections(1).await?;

    let health = server.api_get("/health").await?;
    assert_eq!(health["status"], "ok");

    let status = server.api_get("/status").await?;
    assert!(status["uptime_secs"].is_number(), "missing uptime_secs");
    assert_eq!(status["connections"]["total"], 1);
    assert_eq!(status["connections"]["idle"], 1);
    assert_eq!(status["stats"]["connections_accepted"], 1);
    Ok(())
}

#[tokio::test]
async fn test_session_inspect_and_drop() -> Result<()> {
    let server = TestServer::start().await?;
    let (mut x, mut y, sid) = paired(&server).await?;

    let list = server.api_get("/sessions").await?;
    let sessions = list["sessions"].as_array().context("sessions array")?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["session_id"], sid.to_string());

    let one = server.api_get(&format!("/sessions/{sid}")).await?;
    assert!(one["initiator"].is_string(), "missing initiator");
    assert!(one["joiner"].is_string(), "missing joiner");

    let dropped = server.api_delete(&format!("/sessions/{sid}")).await?;
    assert_eq!(dropped["dropped"], true);
    assert_eq!(x.recv().await?, ServerEvent::PeerDisconnected);
    assert_eq!(y.recv().await?, ServerEvent::PeerDisconnected);

    let again = server.api_delete(&format!("/sessions/{sid}")).await?;
    assert_eq!(again["dropped"], false);
    assert_eq!(server.api_status(&format!("/sessions/{sid}")).await?, 404);
    Ok(())
}

#[tokio::test]
async fn test_bad_session_id_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    assert_eq!(server.api_status("/sessions/not-hex").await?, 400);
    Ok(())
}

#[tokio::test]
async fn test_queue_lists_oldest_first() -> Result<()> {
    let server = TestServer::start().await?;
    let mut a = server.client().await?;
    a.request_pairing().await?;
    assert_eq!(a.recv().await?, ServerEvent::Waiting);

    let queue = server.api_get("/queue").await?;
    let waiting = queue["waiting"].as_array().context("waiting array")?;
    assert_eq!(waiting.len(), 1);
    assert!(waiting[0]["conn_id"].as_str().is_some_and(|c| c.starts_with("conn-")));
    Ok(())
}
