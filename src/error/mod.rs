//! Error Handling Module
//!
//! - Core error type (`LlmError`) and its coarse `ErrorCategory`
//! - Conversions from the HTTP and JSON crates the client sits on
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_stream_client::error::{ErrorCategory, LlmError};
//!
//! let error = LlmError::transport(401, "Unauthorized", None);
//! assert_eq!(error.category(), ErrorCategory::Authentication);
//! ```

mod conversions;
pub mod types;

pub use types::*;
