//! Type Conversions for LlmError
//!
//! From implementations for the error types of the crates the client
//! drives directly.

use super::types::LlmError;

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::transport(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                None,
            );
        }
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<tokio_util::codec::LinesCodecError> for LlmError {
    fn from(err: tokio_util::codec::LinesCodecError) -> Self {
        Self::StreamError(err.to_string())
    }
}
