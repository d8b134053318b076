//! Client Implementation
//!
//! `Client` implements every capability trait against one configured
//! service. It is cheap to clone; clones share the connection pool and the
//! immutable configuration.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::builder::ClientBuilder;
use crate::config::ClientConfig;
use crate::error::LlmError;
use crate::http::{HttpTransport, build_http_client};
use crate::streaming::{CancelHandle, ChatStream, ChunkStream, CompletionStream, decode_chunk};
use crate::traits::*;
use crate::types::*;

#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: HttpTransport,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("api_version", &self.config.api_version)
            .field("models", &self.config.models)
            .field("has_organization", &self.config.organization.is_some())
            .finish()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn new(config: ClientConfig) -> Result<Self, LlmError> {
        let http_client = build_http_client(&config.http)?;
        Self::with_http_client(config, http_client)
    }

    pub fn with_http_client(
        config: ClientConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, LlmError> {
        let transport = HttpTransport::new(http_client, &config)?;
        Ok(Self {
            config: Arc::new(config),
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn open_stream<T, B>(
        &self,
        path: &str,
        body: &B,
        cancel: CancelHandle,
    ) -> Result<ChunkStream<T>, LlmError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.config.endpoint_url(path);
        tracing::debug!(url = %url, "opening stream");
        match self.transport.open_stream(&url, body, &cancel).await? {
            Some(response) => {
                tracing::debug!(url = %url, "streaming");
                Ok(ChunkStream::from_response(
                    response,
                    self.config.http.stream_max_line_length,
                    cancel,
                ))
            }
            None => Ok(ChunkStream::already_cancelled(decode_chunk::<T>, cancel)),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, LlmError> {
        let url = self.config.endpoint_url(path);
        self.transport
            .execute_json::<T, ()>(Method::GET, &url, None)
            .await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, LlmError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.config.endpoint_url(path);
        self.transport
            .execute_json(Method::POST, &url, Some(body))
            .await
    }

    fn chat_request(
        &self,
        messages: Vec<ChatMessage>,
        params: &SamplingParams,
    ) -> Result<ChatCompletionRequest, LlmError> {
        if messages.is_empty() {
            return Err(LlmError::InvalidInput(
                "chat requires at least one message".to_string(),
            ));
        }
        Ok(ChatCompletionRequest::new(self.config.models.chat.clone(), messages).with_params(params))
    }

    fn completion_request(
        &self,
        prompt: String,
        params: &SamplingParams,
    ) -> Result<CompletionRequest, LlmError> {
        if prompt.is_empty() {
            return Err(LlmError::InvalidInput("prompt must not be empty".to_string()));
        }
        Ok(
            CompletionRequest::new(self.config.models.completion.clone(), vec![prompt])
                .with_params(params),
        )
    }
}

fn require_input(input: &[String], what: &str) -> Result<(), LlmError> {
    if input.is_empty() {
        return Err(LlmError::InvalidInput(format!(
            "{what} requires at least one input"
        )));
    }
    Ok(())
}

#[async_trait]
impl ChatCapability for Client {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        params: SamplingParams,
    ) -> Result<ChatCompletion, LlmError> {
        let request = self.chat_request(messages, &params)?.with_streaming(false);
        self.post("chat/completions", &request).await
    }

    async fn chat_stream_with_cancel(
        &self,
        messages: Vec<ChatMessage>,
        params: SamplingParams,
        cancel: CancelHandle,
    ) -> Result<ChatStream, LlmError> {
        let request = self.chat_request(messages, &params)?.with_streaming(true);
        self.open_stream("chat/completions", &request, cancel).await
    }
}

#[async_trait]
impl CompletionCapability for Client {
    async fn complete(
        &self,
        prompt: String,
        params: SamplingParams,
    ) -> Result<Completion, LlmError> {
        let request = self.completion_request(prompt, &params)?.with_streaming(false);
        self.post("completions", &request).await
    }

    async fn completion_stream_with_cancel(
        &self,
        prompt: String,
        params: SamplingParams,
        cancel: CancelHandle,
    ) -> Result<CompletionStream, LlmError> {
        let request = self.completion_request(prompt, &params)?.with_streaming(true);
        self.open_stream("completions", &request, cancel).await
    }
}

#[async_trait]
impl ModelListingCapability for Client {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LlmError> {
        let list: ModelList = self.get("models").await?;
        Ok(list.data)
    }

    async fn retrieve_model(&self, model_id: &str) -> Result<ModelDescriptor, LlmError> {
        if model_id.is_empty() {
            return Err(LlmError::InvalidInput("model id must not be empty".to_string()));
        }
        let path = format!("models/{}", urlencoding::encode(model_id));
        self.get(&path).await
    }
}

#[async_trait]
impl EmbeddingCapability for Client {
    async fn embed(&self, input: Vec<String>) -> Result<EmbeddingResponse, LlmError> {
        require_input(&input, "embedding")?;
        let request = EmbeddingRequest::new(self.config.models.embedding.clone(), input);
        self.post("embeddings", &request).await
    }
}

#[async_trait]
impl ModerationCapability for Client {
    async fn moderate(&self, input: Vec<String>) -> Result<ModerationResponse, LlmError> {
        require_input(&input, "moderation")?;
        let request = ModerationRequest {
            input,
            model: Some(self.config.models.moderation.clone()),
        };
        self.post("moderations", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::new(ClientConfig::new("sk-test")).unwrap()
    }

    #[tokio::test]
    async fn empty_conversation_is_rejected_before_io() {
        let err = client()
            .chat_stream(vec![], SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_io() {
        let err = client()
            .complete(String::new(), SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn empty_embedding_input_is_rejected() {
        let err = client().embed(vec![]).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(msg) if msg.contains("embedding")));
    }

    #[test]
    fn chat_request_uses_configured_model_unless_overridden() {
        let client = client();
        let request = client
            .chat_request(vec![ChatMessage::user("hi")], &SamplingParams::default())
            .unwrap();
        assert_eq!(request.model, "gpt-3.5-turbo");

        let request = client
            .chat_request(
                vec![ChatMessage::user("hi")],
                &SamplingParams::new().with_model("gpt-4"),
            )
            .unwrap();
        assert_eq!(request.model, "gpt-4");
    }

    #[test]
    fn debug_output_hides_credentials() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("sk-test"));
        assert!(rendered.contains("api.openai.com"));
    }
}
