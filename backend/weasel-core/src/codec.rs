//! Reversible transform applied to binary frames.
//!
//! Clients "compress" a serialized message by reversing its characters and
//! sending the result as a binary frame. Reversal is its own inverse, so
//! [`encode`] and [`decode`] perform the same operation; they differ only in
//! which side of the UTF-8 boundary they start from.

use crate::error::codec::TransformError;

use std::str::from_utf8;

use log::warn;

/// Undo the client-side transform on a binary frame payload.
///
/// Returns `None` when the payload is not UTF-8. The failure is logged here and
/// callers are expected to drop the frame.
pub fn decode(bytes: &[u8]) -> Option<String> {
    match try_decode(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Decompression failed: {e}");
            None
        }
    }
}

/// Fallible form of [`decode`].
pub fn try_decode(bytes: &[u8]) -> Result<String, TransformError> {
    let text = from_utf8(bytes)?;
    Ok(reverse(text))
}

/// Apply the transform to outbound text, producing a binary frame payload.
pub fn encode(text: &str) -> Vec<u8> {
    reverse(text).into_bytes()
}

// Reverses by scalar value so the output is always valid UTF-8.
fn reverse(text: &str) -> String {
    text.chars().rev().collect()
}
