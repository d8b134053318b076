//! Core error types

use thiserror::Error;

/// Coarse classification used for presentation and caller-side policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Client,
    Server,
    Network,
    Parsing,
    Configuration,
    Validation,
}

/// Errors produced by the client.
///
/// Cancellation is not represented here: a cancelled stream simply ends and
/// reports [`crate::streaming::StreamState::Cancelled`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} {reason}")]
    TransportError {
        status: u16,
        reason: String,
        /// Response body text, when it could be read.
        body: Option<String>,
    },

    /// A streamed data payload was not a valid chunk document.
    #[error("Failed to decode stream payload: {message}")]
    DecodeError {
        /// The exact payload that failed to decode.
        payload: String,
        message: String,
    },

    /// The request could not be sent or the response headers never arrived.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The response body failed while it was being read.
    #[error("Stream error: {0}")]
    StreamError(String),

    /// A non-streaming response body did not match the expected document.
    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LlmError {
    pub fn transport(status: u16, reason: impl Into<String>, body: Option<String>) -> Self {
        Self::TransportError {
            status,
            reason: reason.into(),
            body,
        }
    }

    pub fn decode(payload: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeError {
            payload: payload.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::TransportError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw payload of a decode failure.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::DecodeError { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TransportError { status, .. } => match status {
                401 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            Self::HttpError(_) | Self::StreamError(_) => ErrorCategory::Network,
            Self::DecodeError { .. } | Self::JsonError(_) => ErrorCategory::Parsing,
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            Self::InvalidInput(_) => ErrorCategory::Validation,
        }
    }
}
