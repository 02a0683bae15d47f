//! Test helpers for the secure WebSocket server.
//!
//! - Fixture paths for the test CA and the `localhost` certificate
//! - Starting a server on an ephemeral port
//! - Connecting a client that trusts the test CA
//! - Waiting on registry membership

use weasel_core::client::WeaselClient;
use weasel_core::config::{ListenConfig, ServerConfig, TlsConfig};
use weasel_core::server::{ConnectionRegistry, ServerHandle, start_server};

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

/// How long to wait for a response that should arrive.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before concluding that no response is coming.
pub const SILENCE: Duration = Duration::from_millis(300);

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("integration_tests")
        .join("fixtures")
        .join(name)
}

/// Config for a server on `127.0.0.1` with an OS-assigned port and the test certificate.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        listen: ListenConfig {
            host: String::from("127.0.0.1"),
            port: 0,
        },
        tls: TlsConfig {
            cert_path: fixture("localhost.crt"),
            key_path: fixture("localhost.key"),
        },
        ..ServerConfig::default()
    }
}

pub async fn start_test_server() -> ServerHandle {
    start_server(&test_config(), ConnectionRegistry::new())
        .await
        .expect("Failed to start test server")
}

/// Connect by name so the certificate's `localhost` SAN is checked.
pub async fn connect(handle: &ServerHandle) -> WeaselClient {
    WeaselClient::connect("localhost", handle.local_addr().port(), &fixture("ca.crt"))
        .await
        .expect("Failed to connect to test server")
}

/// Receive one response, failing the test if none arrives in time.
pub async fn recv(client: &mut WeaselClient) -> Value {
    client
        .recv_response_timeout(RESPONSE_TIMEOUT)
        .await
        .expect("Error receiving response")
        .expect("No response received")
}

/// Assert that nothing arrives for [`SILENCE`].
pub async fn assert_no_response(client: &mut WeaselClient) {
    let response = client
        .recv_response_timeout(SILENCE)
        .await
        .expect("Connection should stay open");
    assert!(response.is_none(), "Expected no response, got {response:?}");
}

/// Poll until the registry holds `expected` connections. Returns `false` on timeout.
pub async fn wait_for_registry_len(registry: &ConnectionRegistry, expected: usize) -> bool {
    let deadline = tokio::time::Instant::now() + RESPONSE_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if registry.len().await == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    registry.len().await == expected
}
