//! Transport adapter
//!
//! Wraps a `reqwest::Client` with the client's fixed headers. Streaming
//! opens return as soon as the response headers arrive; the body is left
//! unread for the stream driver.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_ENCODING, HeaderMap, HeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::LlmError;
use crate::streaming::CancelHandle;

const EVENT_STREAM: &str = "text/event-stream";

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    headers: HeaderMap,
    timeout: Option<Duration>,
    stream_disable_compression: bool,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .field("stream_disable_compression", &self.stream_disable_compression)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client,
            headers: super::default_headers(config)?,
            timeout: config.http.timeout,
            stream_disable_compression: config.http.stream_disable_compression,
        })
    }

    /// POST `body` and wait for the response headers of an event stream.
    ///
    /// Returns `Ok(None)` when `cancel` fires before the stream is open,
    /// including while the body of an error response is still being read.
    pub async fn open_stream<B>(
        &self,
        url: &str,
        body: &B,
        cancel: &CancelHandle,
    ) -> Result<Option<Response>, LlmError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .header(ACCEPT, HeaderValue::from_static(EVENT_STREAM))
            .json(body);
        if self.stream_disable_compression {
            request = request.header(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        }

        tracing::debug!(target: "llm_stream_client::http", method = "POST", url, stream = true, "sending request");
        let opened = async {
            let response = request.send().await?;
            check_status(url, response).await
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(target: "llm_stream_client::http", url, "cancelled while opening stream");
                Ok(None)
            }
            opened = opened => opened.map(Some),
        }
    }

    /// Send one request and decode the full JSON body as `T`.
    pub async fn execute_json<T, B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, LlmError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(self.headers.clone());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(target: "llm_stream_client::http", method = %method, url, stream = false, "sending request");
        let response = check_status(url, request.send().await?).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Map a non-success status to `TransportError`, reading the body for
/// diagnostics.
async fn check_status(url: &str, response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    tracing::debug!(target: "llm_stream_client::http", url, status = status.as_u16(), "response received");
    if status.is_success() {
        return Ok(response);
    }

    let reason = reason_phrase(&response);
    let body = response.text().await.ok().filter(|text| !text.is_empty());
    Err(LlmError::transport(status.as_u16(), reason, body))
}

/// The reason phrase the server sent, or the canonical one for the status.
///
/// hyper only records the phrase when it differs from the canonical text.
fn reason_phrase(response: &Response) -> String {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
        .or_else(|| response.status().canonical_reason())
        .unwrap_or_default()
        .to_string()
}
