// Unit tests for weasel-core
// Integration tests for the public API over real TLS sockets are in integration_tests/

mod message;
mod registry;
mod response;
mod session_state;
