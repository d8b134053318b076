//! HTTP plumbing: header construction, the streaming transport adapter and
//! the single-shot JSON request helper.

pub mod headers;
pub mod transport;

pub use headers::{HttpHeaderBuilder, default_headers};
pub use transport::HttpTransport;

use crate::config::HttpConfig;
use crate::error::LlmError;

/// Build a `reqwest::Client` from `HttpConfig`.
///
/// The request timeout is not set on the client; it is applied per
/// non-streaming request.
pub fn build_http_client(cfg: &HttpConfig) -> Result<reqwest::Client, LlmError> {
    let mut builder = reqwest::Client::builder();

    if let Some(connect_timeout) = cfg.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(user_agent) = &cfg.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder
        .build()
        .map_err(|e| LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}")))
}
