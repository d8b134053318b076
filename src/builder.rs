//! Client Builder
//!
//! Fluent construction of a [`Client`], with environment fallbacks for the
//! credential and endpoint.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::client::Client;
use crate::config::{ClientConfig, HttpConfig, ModelDefaults};
use crate::defaults;
use crate::error::LlmError;

#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_key: Option<SecretString>,
    base_url: String,
    api_version: String,
    organization: Option<String>,
    models: ModelDefaults,
    http: HttpConfig,
    http_client: Option<reqwest::Client>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: defaults::endpoint::BASE_URL.to_string(),
            api_version: defaults::endpoint::API_VERSION.to_string(),
            organization: None,
            models: ModelDefaults::default(),
            http: HttpConfig::default(),
            http_client: None,
        }
    }

    /// Start from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and
    /// `OPENAI_ORGANIZATION`. Explicit setters called afterwards win.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Ok(key) = std::env::var(defaults::env::API_KEY) {
            builder.api_key = Some(SecretString::from(key));
        }
        if let Ok(url) = std::env::var(defaults::env::BASE_URL) {
            builder.base_url = url;
        }
        if let Ok(org) = std::env::var(defaults::env::ORGANIZATION) {
            builder.organization = Some(org);
        }
        builder
    }

    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Version path segment, `v1` by default. Pass `""` for none.
    pub fn api_version<S: Into<String>>(mut self, api_version: S) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn organization<S: Into<String>>(mut self, organization: S) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn chat_model<S: Into<String>>(mut self, model: S) -> Self {
        self.models.chat = model.into();
        self
    }

    pub fn completion_model<S: Into<String>>(mut self, model: S) -> Self {
        self.models.completion = model.into();
        self
    }

    pub fn embedding_model<S: Into<String>>(mut self, model: S) -> Self {
        self.models.embedding = model.into();
        self
    }

    pub fn moderation_model<S: Into<String>>(mut self, model: S) -> Self {
        self.models.moderation = model.into();
        self
    }

    /// Deadline for non-streaming requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.http.user_agent = Some(user_agent.into());
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.http.headers.insert(key.into(), value.into());
        self
    }

    /// Control whether streaming requests ask for uncompressed bodies.
    pub fn http_stream_disable_compression(mut self, disable: bool) -> Self {
        self.http.stream_disable_compression = disable;
        self
    }

    /// Fail a stream whose body sends a line longer than `max` bytes.
    pub fn stream_max_line_length(mut self, max: usize) -> Self {
        self.http.stream_max_line_length = max;
        self
    }

    /// Use a preconfigured `reqwest::Client`. `connect_timeout` and
    /// `user_agent` are then the caller's responsibility.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build_config(self) -> Result<(ClientConfig, Option<reqwest::Client>), LlmError> {
        let api_key = self
            .api_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| {
                LlmError::ConfigurationError(format!(
                    "API key is required (set it on the builder or via {})",
                    defaults::env::API_KEY
                ))
            })?;

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LlmError::ConfigurationError(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        let config = ClientConfig {
            api_key,
            base_url: self.base_url,
            api_version: self.api_version,
            organization: self.organization,
            models: self.models,
            http: self.http,
        };
        Ok((config, self.http_client))
    }

    pub fn build(self) -> Result<Client, LlmError> {
        match self.build_config()? {
            (config, Some(http_client)) => Client::with_http_client(config, http_client),
            (config, None) => Client::new(config),
        }
    }
}
