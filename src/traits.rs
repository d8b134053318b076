//! Capability traits
//!
//! One trait per endpoint family, so callers and test doubles can depend on
//! exactly the surface they use.

use async_trait::async_trait;

use crate::error::LlmError;
use crate::streaming::{CancelHandle, ChatStream, CompletionStream, new_cancel_handle};
use crate::types::{
    ChatCompletion, ChatMessage, Completion, EmbeddingResponse, ModelDescriptor,
    ModerationResponse, SamplingParams,
};

#[async_trait]
pub trait ChatCapability: Send + Sync {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        params: SamplingParams,
    ) -> Result<ChatCompletion, LlmError>;

    /// Stream a chat completion, stopping when `cancel` fires. The same
    /// handle also aborts the wait for response headers.
    async fn chat_stream_with_cancel(
        &self,
        messages: Vec<ChatMessage>,
        params: SamplingParams,
        cancel: CancelHandle,
    ) -> Result<ChatStream, LlmError>;

    async fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        params: SamplingParams,
    ) -> Result<ChatStream, LlmError> {
        self.chat_stream_with_cancel(messages, params, new_cancel_handle())
            .await
    }
}

/// Legacy single-prompt completions
#[async_trait]
pub trait CompletionCapability: Send + Sync {
    async fn complete(
        &self,
        prompt: String,
        params: SamplingParams,
    ) -> Result<Completion, LlmError>;

    async fn completion_stream_with_cancel(
        &self,
        prompt: String,
        params: SamplingParams,
        cancel: CancelHandle,
    ) -> Result<CompletionStream, LlmError>;

    async fn completion_stream(
        &self,
        prompt: String,
        params: SamplingParams,
    ) -> Result<CompletionStream, LlmError> {
        self.completion_stream_with_cancel(prompt, params, new_cancel_handle())
            .await
    }
}

#[async_trait]
pub trait ModelListingCapability: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LlmError>;
    async fn retrieve_model(&self, model_id: &str) -> Result<ModelDescriptor, LlmError>;

    async fn is_model_available(&self, model_id: &str) -> Result<bool, LlmError> {
        match self.retrieve_model(model_id).await {
            Ok(_) => Ok(true),
            Err(LlmError::TransportError { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
pub trait EmbeddingCapability: Send + Sync {
    async fn embed(&self, input: Vec<String>) -> Result<EmbeddingResponse, LlmError>;
}

#[async_trait]
pub trait ModerationCapability: Send + Sync {
    async fn moderate(&self, input: Vec<String>) -> Result<ModerationResponse, LlmError>;
}
