//! llm-stream-client
//!
//! Typed client for OpenAI-style text generation services. Chat and legacy
//! completions can be streamed as cancellable sequences of decoded chunks;
//! model listing, embeddings and moderation are plain request/response calls.
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use llm_stream_client::prelude::*;
//!
//! let client = Client::builder().api_key("sk-...").build()?;
//! let mut stream = client
//!     .chat_stream(vec![ChatMessage::user("Hello!")], SamplingParams::default())
//!     .await?;
//! while let Some(chunk) = stream.next().await {
//!     if let Some(text) = chunk?.content() {
//!         print!("{text}");
//!     }
//! }
//! assert_eq!(stream.state(), StreamState::Done);
//! ```
#![deny(unsafe_code)]

pub mod builder;
pub mod client;
pub mod config;
pub mod defaults;
pub mod error;
pub mod http;
pub mod observability;
pub mod streaming;
pub mod traits;
pub mod types;

pub use builder::ClientBuilder;
pub use client::Client;
pub use error::LlmError;

pub mod prelude {
    pub use crate::builder::ClientBuilder;
    pub use crate::client::Client;
    pub use crate::config::{ClientConfig, HttpConfig, ModelDefaults};
    pub use crate::error::{ErrorCategory, LlmError};
    pub use crate::streaming::{
        CancelHandle, ChatStream, ChunkStream, CompletionStream, StreamState, new_cancel_handle,
    };
    pub use crate::traits::*;
    pub use crate::types::*;
}
