//! Shared plumbing for the weasel workspace.
//!
//! Every error type in `weasel-core` and the `weasel` binary records where it
//! was raised through [`ErrorLocation`], so log lines point straight at the
//! failing call site instead of at the logging statement.

pub mod error;

pub use error::error_location::ErrorLocation;
