use crate::helpers::{
    assert_no_response, connect, recv, start_test_server, wait_for_registry_len,
};

use weasel_core::codec;
use weasel_core::message::NoticeKind;
use weasel_core::response::notice_status;

use std::time::Duration;

use serde_json::json;
use tokio_tungstenite::connect_async;

// ============================================================================
// Acknowledgements over a real wss:// connection
// ============================================================================

/// **VALUE**: Verifies the heartbeat round trip end to end.
///
/// **WHY THIS MATTERS**: Heartbeats are how clients detect a dead server and measure
/// latency. This covers TLS, the WebSocket upgrade, dispatch and the reply together.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The TLS acceptor cannot be built from PEM files
/// - The upgrade never completes
/// - The timestamp is rewritten instead of echoed
#[tokio::test]
async fn given_running_server_when_heartbeat_sent_then_timestamp_is_echoed() {
    // GIVEN: A server and a connected client
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    // WHEN: Sending a heartbeat
    client
        .send_raw_text(r#"{"type":"heartbeat","timestamp":1700000000}"#)
        .await
        .unwrap();

    // THEN: The acknowledgement echoes the timestamp exactly
    assert_eq!(
        recv(&mut client).await,
        json!({"type":"heartbeat_ack","timestamp":1700000000,"status":"heartbeat received"})
    );
}

#[tokio::test]
async fn given_running_server_when_text_without_id_sent_then_ack_has_null_id() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    client
        .send_raw_text(r#"{"type":"text","content":"Hello"}"#)
        .await
        .unwrap();

    assert_eq!(
        recv(&mut client).await,
        json!({"type":"text_ack","id":null,"status":"text received","content":"Hello"})
    );
}

#[tokio::test]
async fn given_running_server_when_unknown_type_sent_then_acknowledged_as_unknown() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    client.send_raw_text(r#"{"type":"mystery"}"#).await.unwrap();

    assert_eq!(
        recv(&mut client).await,
        json!({"type":"mystery_ack","status":"unknown message type"})
    );
}

/// **VALUE**: Verifies every notice type is acknowledged with its fixed status, in order.
#[tokio::test]
async fn given_every_notice_type_when_sent_then_each_gets_its_status() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    for kind in NoticeKind::ALL {
        client.send(json!({"type": kind.tag()})).await.unwrap();
    }

    for kind in NoticeKind::ALL {
        let ack = recv(&mut client).await;
        assert_eq!(
            ack,
            json!({"type": format!("{}_ack", kind.tag()), "status": notice_status(kind)})
        );
    }
}

// ============================================================================
// Malformed input
// ============================================================================

/// **VALUE**: Verifies malformed frames get no reply and do not close the connection.
///
/// **WHY THIS MATTERS**: One buggy message from a client must not cost it the session.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The server replies with an error frame (clients do not expect one)
/// - A decode failure ends the receive loop
#[tokio::test]
async fn given_malformed_frames_when_sent_then_no_reply_and_connection_survives() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    // WHEN: Sending garbage and a message with no type
    client.send_raw_text("this is not json").await.unwrap();
    assert_no_response(&mut client).await;

    client
        .send_raw_text(r#"{"content":"no type"}"#)
        .await
        .unwrap();
    assert_no_response(&mut client).await;

    // THEN: The same connection still answers valid messages
    client.send_raw_text(r#"{"type":"metrics"}"#).await.unwrap();
    assert_eq!(
        recv(&mut client).await,
        json!({"type":"metrics_ack","status":"metrics collected"})
    );
    assert_eq!(handle.registry().len().await, 1);
}

#[tokio::test]
async fn given_undecodable_binary_when_sent_then_dropped_silently() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    client
        .send_raw_binary(vec![0xc3, 0x28, 0xa0, 0xa1])
        .await
        .unwrap();
    assert_no_response(&mut client).await;

    client.send_raw_text(r#"{"type":"api"}"#).await.unwrap();
    assert_eq!(recv(&mut client).await["status"], "API abstraction tested");
}

/// **VALUE**: Verifies compressed binary frames are decoded and acknowledged as text.
#[tokio::test]
async fn given_compressed_message_when_sent_then_acknowledged() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    client
        .send_compressed(json!({"type":"text","id":"z-1","content":"squeezed"}))
        .await
        .unwrap();

    assert_eq!(
        recv(&mut client).await,
        json!({"type":"text_ack","id":"z-1","status":"text received","content":"squeezed"})
    );

    // Raw bytes from the codec, bypassing the client helper
    client
        .send_raw_binary(codec::encode(r#"{"type":"routing"}"#))
        .await
        .unwrap();
    assert_eq!(
        recv(&mut client).await["status"],
        "message routed intelligently"
    );
}

// ============================================================================
// Connection registry
// ============================================================================

/// **VALUE**: Verifies a gracefully closed connection leaves the registry.
#[tokio::test]
async fn given_connected_client_when_closed_then_removed_from_registry() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    client.send(json!({"type":"session"})).await.unwrap();
    recv(&mut client).await;
    assert!(wait_for_registry_len(handle.registry(), 1).await);

    client.close().await.unwrap();

    assert!(
        wait_for_registry_len(handle.registry(), 0).await,
        "Closed connection should be unregistered"
    );
}

/// **VALUE**: Verifies an abruptly dropped connection also leaves the registry.
///
/// **BUG THIS CATCHES**: Would catch cleanup that only runs after a close frame, which
/// leaks an entry per client that disappears from the network.
#[tokio::test]
async fn given_connected_client_when_aborted_then_removed_from_registry() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    client.send(json!({"type":"custom"})).await.unwrap();
    recv(&mut client).await;
    assert!(wait_for_registry_len(handle.registry(), 1).await);

    client.abort();

    assert!(
        wait_for_registry_len(handle.registry(), 0).await,
        "Aborted connection should be unregistered"
    );
}

/// **VALUE**: Verifies concurrent clients are isolated from each other.
///
/// **WHY THIS MATTERS**: Responses go back on the connection that sent the request;
/// a shared writer would deliver acknowledgements to the wrong client.
#[tokio::test]
async fn given_multiple_clients_when_sending_concurrently_then_each_gets_own_responses() {
    let handle = start_test_server().await;

    let mut tasks = Vec::new();
    for n in 0..5 {
        let mut client = connect(&handle).await;
        tasks.push(tokio::spawn(async move {
            for i in 0..10 {
                let content = format!("client-{n}-msg-{i}");
                client
                    .send(json!({"type":"text","id":i,"content":content}))
                    .await
                    .unwrap();
            }
            for i in 0..10 {
                let ack = recv(&mut client).await;
                assert_eq!(ack["id"], i);
                assert_eq!(ack["content"], format!("client-{n}-msg-{i}"));
            }
            client
        }));
    }

    let mut clients = Vec::new();
    for task in tasks {
        clients.push(task.await.expect("client task panicked"));
    }
    assert!(wait_for_registry_len(handle.registry(), 5).await);

    for client in clients {
        client.close().await.unwrap();
    }
    assert!(wait_for_registry_len(handle.registry(), 0).await);
}

// ============================================================================
// Transport
// ============================================================================

/// **VALUE**: Verifies plaintext clients are rejected without affecting the listener.
#[tokio::test]
async fn given_plaintext_client_when_connecting_then_rejected_and_server_keeps_serving() {
    let handle = start_test_server().await;

    let url = format!("ws://127.0.0.1:{}", handle.local_addr().port());
    let attempt = tokio::time::timeout(Duration::from_secs(5), connect_async(url.as_str()))
        .await
        .expect("Rejection should be prompt");
    assert!(attempt.is_err(), "Plaintext upgrade must not succeed");

    let mut client = connect(&handle).await;
    client.send_raw_text(r#"{"type":"qos"}"#).await.unwrap();
    assert_eq!(recv(&mut client).await["status"], "QoS settings applied");
    assert_eq!(handle.registry().len().await, 1);
}

/// **VALUE**: Verifies shutdown stops accepting but leaves existing sessions running.
#[tokio::test]
async fn given_shutdown_when_requested_then_existing_sessions_continue() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    handle.shutdown();

    client.send_raw_text(r#"{"type":"config"}"#).await.unwrap();
    assert_eq!(
        recv(&mut client).await["status"],
        "dynamic configuration updated"
    );

    let registry = handle.registry().clone();
    assert!(handle.wait().await.is_err());
    assert_eq!(registry.len().await, 1);
}
