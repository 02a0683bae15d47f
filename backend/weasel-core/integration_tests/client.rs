use crate::helpers::{RESPONSE_TIMEOUT, connect, fixture, recv, start_test_server};

use weasel_core::client::WeaselClient;
use weasel_core::error::client::ClientError;

use serde_json::json;
use tokio::net::TcpListener;

/// **VALUE**: Verifies latency is measured from the echoed heartbeat timestamp.
#[tokio::test]
async fn given_connected_client_when_measuring_latency_then_returns_small_duration() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    let latency = client.measure_latency().await.unwrap();

    assert!(latency < RESPONSE_TIMEOUT, "Loopback latency was {latency:?}");
}

#[tokio::test]
async fn given_heartbeat_when_sent_then_ack_carries_same_timestamp() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    let sent = client.heartbeat().await.unwrap();
    let ack = recv(&mut client).await;

    assert_eq!(ack["type"], "heartbeat_ack");
    assert_eq!(ack["timestamp"], sent);
}

/// **VALUE**: Verifies the client assigns an id the server then echoes.
///
/// **WHY THIS MATTERS**: Correlating text acknowledgements relies on the id surviving
/// the round trip unchanged.
#[tokio::test]
async fn given_text_without_id_when_sent_by_client_then_echoed_id_is_assigned_one() {
    let handle = start_test_server().await;
    let mut client = connect(&handle).await;

    client
        .send(json!({"type":"text","content":"auto id"}))
        .await
        .unwrap();
    let ack = recv(&mut client).await;

    assert!(ack["id"].is_u64(), "Expected numeric id, got {}", ack["id"]);
    assert_eq!(ack["content"], "auto id");
}

#[tokio::test]
async fn given_no_listener_when_connecting_then_returns_connect_error() {
    // GIVEN: A port nobody is listening on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = WeaselClient::connect("127.0.0.1", port, &fixture("ca.crt")).await;

    assert!(
        matches!(result, Err(ClientError::Connect { .. })),
        "Expected connect error"
    );
}

/// **VALUE**: Verifies the client refuses to run without a trust root.
#[tokio::test]
async fn given_missing_root_certificate_when_connecting_then_returns_tls_error() {
    let handle = start_test_server().await;

    let result = WeaselClient::connect(
        "localhost",
        handle.local_addr().port(),
        &fixture("missing-ca.crt"),
    )
    .await;

    assert!(matches!(result, Err(ClientError::Tls { .. })));
}

/// **VALUE**: Verifies the client rejects a server certificate it cannot chain to its root.
///
/// **BUG THIS CATCHES**: Would catch a client that skips certificate verification and
/// so talks to anyone on the port.
#[tokio::test]
async fn given_untrusted_server_certificate_when_connecting_then_returns_tls_error() {
    let handle = start_test_server().await;

    // Trust only the leaf, not the CA that issued it
    let result = WeaselClient::connect(
        "localhost",
        handle.local_addr().port(),
        &fixture("localhost.crt"),
    )
    .await;

    assert!(
        matches!(result, Err(ClientError::Tls { .. })),
        "Expected TLS error"
    );
}
