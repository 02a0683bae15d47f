pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod response;
pub mod server;

#[cfg(test)]
mod tests;

pub const WEASEL_DEFAULT_HOST: &str = "localhost";
pub const WEASEL_DEFAULT_PORT: u16 = 8765;
pub const WEASEL_DEFAULT_URL: &str =
    const_format::concatcp!("wss://", WEASEL_DEFAULT_HOST, ":", WEASEL_DEFAULT_PORT);
