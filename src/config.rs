//! Client configuration
//!
//! `ClientConfig` is immutable once the client is built and is shared
//! read-only by every call, streaming or not.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::defaults;

/// Model identifiers used when a request does not name one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefaults {
    pub chat: String,
    pub completion: String,
    pub embedding: String,
    pub moderation: String,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            chat: defaults::models::CHAT.to_string(),
            completion: defaults::models::COMPLETION.to_string(),
            embedding: defaults::models::EMBEDDING.to_string(),
            moderation: defaults::models::MODERATION.to_string(),
        }
    }
}

/// HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Whole-request deadline for non-streaming calls.
    ///
    /// Streaming calls ignore it: a streamed body stays open for as long as
    /// the model keeps generating.
    pub timeout: Option<Duration>,
    /// Connection timeout, applied to every call.
    pub connect_timeout: Option<Duration>,
    /// Extra headers sent with every request.
    pub headers: HashMap<String, String>,
    pub user_agent: Option<String>,
    /// When `true`, streaming requests send `Accept-Encoding: identity`.
    pub stream_disable_compression: bool,
    /// Upper bound, in bytes, on one line of a streamed body.
    pub stream_max_line_length: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let sdc = match std::env::var(defaults::env::STREAM_DISABLE_COMPRESSION) {
            Ok(val) => {
                let v = val.trim().to_lowercase();
                !(v == "false" || v == "0" || v == "off" || v == "no")
            }
            Err(_) => true,
        };
        Self {
            timeout: Some(defaults::http::REQUEST_TIMEOUT),
            connect_timeout: Some(defaults::http::CONNECT_TIMEOUT),
            headers: HashMap::new(),
            user_agent: Some(defaults::http::USER_AGENT.to_string()),
            stream_disable_compression: sdc,
            stream_max_line_length: defaults::http::MAX_STREAM_LINE_LENGTH,
        }
    }
}

/// Full client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer token attached to every request. Never logged.
    pub api_key: SecretString,
    pub base_url: String,
    /// Version path segment between the base URL and the endpoint path.
    pub api_version: String,
    pub organization: Option<String>,
    pub models: ModelDefaults,
    pub http: HttpConfig,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: defaults::endpoint::BASE_URL.to_string(),
            api_version: defaults::endpoint::API_VERSION.to_string(),
            organization: None,
            models: ModelDefaults::default(),
            http: HttpConfig::default(),
        }
    }

    /// Join base URL, version segment and endpoint path with single slashes.
    ///
    /// An empty version segment is skipped, for gateways that mount the API
    /// at the root.
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let version = self.api_version.trim_matches('/');
        let path = path.trim_start_matches('/');
        if version.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{version}/{path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_segments_with_single_slashes() {
        let mut config = ClientConfig::new("sk-test");
        assert_eq!(
            config.endpoint_url("chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );

        config.base_url = "http://localhost:8080/".to_string();
        config.api_version = "/v2/".to_string();
        assert_eq!(
            config.endpoint_url("/models"),
            "http://localhost:8080/v2/models"
        );

        config.api_version = String::new();
        assert_eq!(config.endpoint_url("models"), "http://localhost:8080/models");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ClientConfig::new("sk-very-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
    }

    #[test]
    fn model_defaults_cover_every_endpoint() {
        let models = ModelDefaults::default();
        assert_eq!(models.chat, "gpt-3.5-turbo");
        assert_eq!(models.completion, "text-davinci-003");
        assert_eq!(models.embedding, "text-embedding-ada-002");
        assert_eq!(models.moderation, "text-moderation-latest");
    }
}
