//! Default Configuration Values
//!
//! Every default the client falls back to lives here.

use std::time::Duration;

/// Service endpoint defaults
pub mod endpoint {
    pub const BASE_URL: &str = "https://api.openai.com";
    pub const API_VERSION: &str = "v1";
}

/// Per-endpoint model identifiers
pub mod models {
    pub const CHAT: &str = "gpt-3.5-turbo";
    pub const COMPLETION: &str = "text-davinci-003";
    pub const EMBEDDING: &str = "text-embedding-ada-002";
    pub const MODERATION: &str = "text-moderation-latest";
}

/// HTTP client defaults
pub mod http {
    use super::*;

    /// Applied to non-streaming requests only.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub const USER_AGENT: &str = concat!("llm-stream-client/", env!("CARGO_PKG_VERSION"));

    /// Longest event-stream line buffered before the stream fails.
    pub const MAX_STREAM_LINE_LENGTH: usize = 1024 * 1024;
}

/// Environment variables read by `ClientBuilder::from_env`
pub mod env {
    pub const API_KEY: &str = "OPENAI_API_KEY";
    pub const BASE_URL: &str = "OPENAI_BASE_URL";
    pub const ORGANIZATION: &str = "OPENAI_ORGANIZATION";
    pub const STREAM_DISABLE_COMPRESSION: &str = "LLM_STREAM_DISABLE_COMPRESSION";
}
