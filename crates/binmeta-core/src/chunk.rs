//! # Chunk Codec
//!
//! Reversible transform between a byte buffer and an ordered list of
//! bounded-length strings.
//!
//! The embedding medium caps every string field, so a payload is first
//! rendered as padded standard base64 and then cut into pieces of at most
//! `MAX_CHUNK_LENGTH` characters. Decoding concatenates the pieces in the
//! order given and reverses the base64 step.
//!
//! - `decode(encode(b)) == b` for every buffer
//! - `encode(&[])` is an empty list
//! - chunk order matters; chunk boundaries do not

use crate::BinmetaError;
use crate::primitives::MAX_CHUNK_LENGTH;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode bytes into chunks of at most `MAX_CHUNK_LENGTH` characters.
#[must_use]
pub fn encode(bytes: &[u8]) -> Vec<String> {
    split(&STANDARD.encode(bytes), MAX_CHUNK_LENGTH)
}

/// Encode bytes into chunks of at most `limit` characters.
///
/// A zero limit cannot hold any content and is rejected.
pub fn encode_with_limit(bytes: &[u8], limit: usize) -> Result<Vec<String>, BinmetaError> {
    if limit == 0 {
        return Err(BinmetaError::Codec(
            "chunk limit must be at least one character".to_string(),
        ));
    }
    Ok(split(&STANDARD.encode(bytes), limit))
}

/// Decode an ordered list of chunks back into bytes.
///
/// Fails with `BinmetaError::Codec` when the concatenated text is not
/// valid padded base64.
pub fn decode<S: AsRef<str>>(chunks: &[S]) -> Result<Vec<u8>, BinmetaError> {
    let total: usize = chunks.iter().map(|c| c.as_ref().len()).sum();
    let mut text = String::with_capacity(total);
    for chunk in chunks {
        text.push_str(chunk.as_ref());
    }

    STANDARD
        .decode(text.as_bytes())
        .map_err(|e| BinmetaError::Codec(format!("malformed chunk content: {}", e)))
}

/// Cut ASCII text into pieces of at most `limit` characters.
fn split(text: &str, limit: usize) -> Vec<String> {
    // base64 output is pure ASCII, so byte and char boundaries coincide.
    text.as_bytes()
        .chunks(limit)
        .map(|piece| piece.iter().map(|&b| char::from(b)).collect())
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
