// Integration tests for weasel-core
// These drive the public API over real TLS sockets on 127.0.0.1

mod client;
mod errors;
mod helpers;
mod server;
