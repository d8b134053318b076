//! HTTP Headers Utility

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use std::collections::HashMap;

use crate::config::ClientConfig;
use crate::error::LlmError;

/// HTTP header builder for API requests
#[derive(Debug, Default)]
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add Bearer token authorization. The value is marked sensitive so it
    /// is hidden from `HeaderMap` debug output.
    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self, LlmError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid API key format: {e}"))
        })?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, LlmError> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
        })?;
        self.headers.insert(
            header_name,
            HeaderValue::from_str(value).map_err(|e| {
                LlmError::ConfigurationError(format!("Invalid header value for '{name}': {e}"))
            })?,
        );
        Ok(self)
    }

    pub fn with_custom_headers(
        mut self,
        custom_headers: &HashMap<String, String>,
    ) -> Result<Self, LlmError> {
        for (key, value) in custom_headers {
            self = self.with_header(key, value)?;
        }
        Ok(self)
    }

    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

/// Headers attached to every request made with `config`.
pub fn default_headers(config: &ClientConfig) -> Result<HeaderMap, LlmError> {
    let mut builder = HttpHeaderBuilder::new()
        .with_bearer_auth(config.api_key.expose_secret())?
        .with_json_content_type();
    if let Some(org) = &config.organization {
        builder = builder.with_header("OpenAI-Organization", org)?;
    }
    Ok(builder.with_custom_headers(&config.http.headers)?.build())
}
