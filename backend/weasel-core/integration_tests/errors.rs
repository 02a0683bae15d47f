use crate::helpers::{fixture, start_test_server, test_config};

use weasel_core::error::credential::CredentialError;
use weasel_core::error::server::ServerError;
use weasel_core::server::{ConnectionRegistry, start_server};

// ============================================================================
// start_server() - startup failures
// ============================================================================

/// **VALUE**: Verifies the server refuses to start without its certificate.
///
/// **WHY THIS MATTERS**: There is no plaintext fallback. A missing certificate must be
/// a loud startup failure, not a listener that fails every handshake.
#[tokio::test]
async fn given_missing_certificate_when_starting_then_returns_credential_error() {
    let mut config = test_config();
    config.tls.cert_path = fixture("nope.crt");

    let result = start_server(&config, ConnectionRegistry::new()).await;

    assert!(matches!(
        result,
        Err(ServerError::Credential(CredentialError::Certificate { .. }))
    ));
}

#[tokio::test]
async fn given_garbage_key_when_starting_then_returns_credential_error() {
    let mut config = test_config();
    config.tls.key_path = fixture("garbage.pem");

    let result = start_server(&config, ConnectionRegistry::new()).await;

    assert!(matches!(
        result,
        Err(ServerError::Credential(CredentialError::PrivateKey { .. }))
    ));
}

/// **VALUE**: Verifies a port conflict is reported as a bind error naming the address.
#[tokio::test]
async fn given_port_in_use_when_starting_then_returns_bind_error() {
    // GIVEN: A server already bound to a port
    let first = start_test_server().await;
    let mut config = test_config();
    config.listen.port = first.local_addr().port();

    // WHEN: Starting a second server on the same port
    let result = start_server(&config, ConnectionRegistry::new()).await;

    // THEN: Bind fails with the requested address
    match result {
        Err(ServerError::Bind { address, .. }) => {
            assert_eq!(address, format!("127.0.0.1:{}", first.local_addr().port()))
        }
        Err(other) => panic!("Expected Bind error, got {other:?}"),
        Ok(_) => panic!("Second bind on the same port should fail"),
    }
}

#[tokio::test]
async fn given_credential_error_when_displayed_then_names_the_file() {
    let mut config = test_config();
    config.tls.cert_path = fixture("nope.crt");

    let Err(err) = start_server(&config, ConnectionRegistry::new()).await else {
        panic!("Start should fail");
    };

    assert!(err.to_string().contains("nope.crt"), "{err}");
}
