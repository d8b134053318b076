//! Streaming decode pipeline
//!
//! Response body → lines → `data: ` payloads → `[DONE]` filter → typed
//! chunks, exposed as a cancellable [`ChunkStream`].

pub mod cancel;
pub mod decode;
pub mod driver;
pub mod sse;

pub use cancel::{CancelHandle, new_cancel_handle};
pub use decode::{ChunkShape, DecodedChunk, decode, decode_chunk};
pub use driver::{
    ChatStream, ChunkStream, CompletionStream, LineStream, StreamState, response_lines,
};
pub use sse::{DATA_MARKER, DONE_SENTINEL, extract_payload, is_done_sentinel};
