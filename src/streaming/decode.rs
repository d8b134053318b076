//! Typed chunk decoding

use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::types::{ChatChunk, CompletionChunk};

/// Which response shape a payload is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkShape {
    /// `POST /completions` with `stream: true`
    Completion,
    /// `POST /chat/completions` with `stream: true`
    Chat,
}

/// A decoded chunk tagged with the endpoint that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedChunk {
    Completion(CompletionChunk),
    Chat(ChatChunk),
}

/// Parse one payload into `T`.
///
/// Failures keep the raw payload so the caller can see exactly what the
/// server sent.
pub fn decode_chunk<T: DeserializeOwned>(payload: &str) -> Result<T, LlmError> {
    serde_json::from_str(payload).map_err(|e| LlmError::decode(payload, e.to_string()))
}

/// Parse one payload according to `shape`.
pub fn decode(payload: &str, shape: ChunkShape) -> Result<DecodedChunk, LlmError> {
    match shape {
        ChunkShape::Completion => decode_chunk(payload).map(DecodedChunk::Completion),
        ChunkShape::Chat => decode_chunk(payload).map(DecodedChunk::Chat),
    }
}
