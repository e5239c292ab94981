//! Request and response bodies exchanged with the inference server.
//!
//! Response types deliberately leave required fields without `#[serde(default)]`
//! so that a payload missing them fails to decode instead of being papered
//! over with placeholders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub custom_metadata: Option<ModelMetadata>,
}

impl ModelInfo {
    pub fn model_type(&self) -> Option<&str> {
        self.custom_metadata.as_ref().and_then(|m| m.model_type.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub model_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub input: &'a [String],
    pub model: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingDatum {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CreateVectorStoreRequest<'a> {
    pub vector_store_id: &'a str,
    pub embedding_model: &'a str,
    pub embedding_dimension: usize,
    pub provider_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct VectorStore {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub chunk_metadata: ChunkMetadata,
}

#[derive(Debug, Serialize)]
pub struct InsertChunksRequest<'a> {
    pub vector_store_id: &'a str,
    pub chunks: &'a [Chunk],
}

#[derive(Debug, Serialize)]
pub struct QueryChunksRequest<'a> {
    pub vector_store_id: &'a str,
    pub query: &'a str,
    pub params: QueryParams,
}

#[derive(Debug, Serialize)]
pub struct QueryParams {
    pub k: usize,
}

/// Scores arrive either on each chunk or as a parallel top-level array,
/// depending on the server version.
#[derive(Debug, Deserialize)]
pub struct QueryChunksResponse {
    pub chunks: Vec<ScoredChunk>,
    #[serde(default)]
    pub scores: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
pub struct ScoredChunk {
    pub content: String,
    pub chunk_metadata: ChunkMetadata,
    #[serde(default)]
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}
