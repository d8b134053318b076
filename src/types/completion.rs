//! Legacy text completion types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{FinishReason, SamplingParams, Usage};

/// Body of `POST /completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    /// Encoded as a JSON array; the service accepts one or many prompts.
    pub prompt: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: Vec<String>) -> Self {
        Self {
            model: model.into(),
            prompt,
            max_tokens: None,
            temperature: None,
            top_p: None,
            stop: None,
            user: None,
            stream: false,
        }
    }

    pub fn with_params(mut self, params: &SamplingParams) -> Self {
        if let Some(model) = &params.model {
            self.model = model.clone();
        }
        self.max_tokens = params.max_tokens;
        self.temperature = params.temperature;
        self.top_p = params.top_p;
        self.stop = params.stop.clone();
        self.user = params.user.clone();
        self
    }

    pub const fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<serde_json::Value>,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

/// A complete (non-streamed) text completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.text.as_str())
    }
}

/// One streamed text completion chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object: String,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<CompletionChoice>,
}

impl CompletionChunk {
    /// Text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.text.as_str())
    }
}
