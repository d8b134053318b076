//! Embedding types

use serde::{Deserialize, Serialize};

use super::common::Usage;

/// Body of `POST /embeddings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
            user: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    #[serde(default)]
    pub object: String,
    pub embedding: Vec<f32>,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub object: String,
    pub data: Vec<EmbeddingVector>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
}

impl EmbeddingResponse {
    /// Vectors ordered by their input index.
    pub fn vectors(&self) -> Vec<&[f32]> {
        let mut data: Vec<&EmbeddingVector> = self.data.iter().collect();
        data.sort_by_key(|v| v.index);
        data.into_iter().map(|v| v.embedding.as_slice()).collect()
    }
}
