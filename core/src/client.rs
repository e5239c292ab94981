use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use stackrag_memory::SearchHit;
use tracing::debug;

use crate::config::Config;
use crate::config_types::ChatSettings;
use crate::error::ClientError;
use crate::protocol::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Chunk, CreateVectorStoreRequest,
    EmbeddingDatum, EmbeddingRequest, EmbeddingResponse, HealthResponse, InsertChunksRequest,
    ModelInfo, ModelList, QueryChunksRequest, QueryChunksResponse, QueryParams, VectorStore,
};

const HEALTH: &str = "/v1/health";
const MODELS: &str = "/v1/models";
const EMBEDDINGS: &str = "/v1/embeddings";
const VECTOR_STORES: &str = "/v1/vector_stores";
const VECTOR_IO_INSERT: &str = "/v1/vector-io/insert";
const VECTOR_IO_QUERY: &str = "/v1/vector-io/query";
const CHAT_COMPLETIONS: &str = "/v1/chat/completions";

/// Thin typed client for a LlamaStack-compatible inference server.
///
/// Every call is attempted once. Non-2xx responses surface as
/// [`ClientError::Status`] with the response body attached.
#[derive(Debug, Clone)]
pub struct LlamaStackClient {
    base_url: String,
    api_token: Option<String>,
    health_timeout: Duration,
    http: Client,
}

impl LlamaStackClient {
    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            health_timeout: Duration::from_secs(10),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url, config.api_token.clone())
            .with_health_timeout(Duration::from_secs(config.health_timeout_secs))
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let rb = self.http.request(method, format!("{}{endpoint}", self.base_url));
        match &self.api_token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    /// Send the request and return the body of a successful response.
    async fn send(&self, rb: RequestBuilder, endpoint: &str) -> Result<String, ClientError> {
        debug!(endpoint, "sending request");
        let transport = |source| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };
        let resp = rb.send().await.map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(ClientError::Status { endpoint: endpoint.to_string(), status, body });
        }
        debug!(endpoint, %status, bytes = body.len(), "response received");
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        rb: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ClientError> {
        let body = self.send(rb, endpoint).await?;
        serde_json::from_str(&body).map_err(|source| ClientError::MalformedResponse {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Succeeds when the server answers the health endpoint with a 2xx
    /// status. The body is informational only.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let rb = self.request(Method::GET, HEALTH).timeout(self.health_timeout);
        let body = self.send(rb, HEALTH).await?;
        Ok(serde_json::from_str(&body).unwrap_or(HealthResponse { status: None }))
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ClientError> {
        let list: ModelList = self.send_json(self.request(Method::GET, MODELS), MODELS).await?;
        Ok(list.data)
    }

    /// One embedding per input text, in input order. All returned vectors
    /// share a single non-zero dimension.
    ///
    /// When the server numbers its items, the indices must cover `0..n`
    /// exactly once each; otherwise items are taken in response order.
    pub async fn embed(
        &self,
        texts: &[String],
        model: &str,
    ) -> Result<Vec<Vec<f32>>, ClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let payload = EmbeddingRequest { input: texts, model };
        let rb = self.request(Method::POST, EMBEDDINGS).json(&payload);
        let parsed: EmbeddingResponse = self.send_json(rb, EMBEDDINGS).await?;

        let n = texts.len();
        if parsed.data.len() != n {
            return Err(ClientError::UnexpectedCount {
                endpoint: EMBEDDINGS.to_string(),
                what: "embeddings",
                expected: n,
                got: parsed.data.len(),
            });
        }
        let vectors = if parsed.data.iter().any(|d| d.index.is_some()) {
            order_by_index(parsed.data, n)?
        } else {
            parsed.data.into_iter().map(|d| d.embedding).collect()
        };

        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        if dim == 0 {
            return Err(ClientError::MissingField {
                endpoint: EMBEDDINGS.to_string(),
                field: "data[].embedding",
            });
        }
        if let Some(v) = vectors.iter().find(|v| v.len() != dim) {
            return Err(ClientError::UnexpectedCount {
                endpoint: EMBEDDINGS.to_string(),
                what: "embedding dimensions",
                expected: dim,
                got: v.len(),
            });
        }
        debug!(count = vectors.len(), dim, model, "generated embeddings");
        Ok(vectors)
    }

    /// Create a vector store and return the identifier the server assigned.
    pub async fn create_vector_store(
        &self,
        request: &CreateVectorStoreRequest<'_>,
    ) -> Result<String, ClientError> {
        let rb = self.request(Method::POST, VECTOR_STORES).json(request);
        let store: VectorStore = self.send_json(rb, VECTOR_STORES).await?;
        Ok(store.id)
    }

    pub async fn insert_chunks(
        &self,
        vector_store_id: &str,
        chunks: &[Chunk],
    ) -> Result<(), ClientError> {
        let payload = InsertChunksRequest { vector_store_id, chunks };
        let rb = self.request(Method::POST, VECTOR_IO_INSERT).json(&payload);
        self.send(rb, VECTOR_IO_INSERT).await?;
        Ok(())
    }

    /// Let the server embed `query` and return its `k` nearest chunks.
    pub async fn query_chunks(
        &self,
        vector_store_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>, ClientError> {
        let payload = QueryChunksRequest { vector_store_id, query, params: QueryParams { k } };
        let rb = self.request(Method::POST, VECTOR_IO_QUERY).json(&payload);
        let parsed: QueryChunksResponse = self.send_json(rb, VECTOR_IO_QUERY).await?;

        if let Some(scores) = &parsed.scores {
            if scores.len() != parsed.chunks.len() {
                return Err(ClientError::UnexpectedCount {
                    endpoint: VECTOR_IO_QUERY.to_string(),
                    what: "scores",
                    expected: parsed.chunks.len(),
                    got: scores.len(),
                });
            }
        }

        parsed
            .chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| -> Result<SearchHit, ClientError> {
                let score = chunk
                    .score
                    .or_else(|| parsed.scores.as_ref().and_then(|s| s.get(i).copied()))
                    .ok_or(ClientError::MissingField {
                        endpoint: VECTOR_IO_QUERY.to_string(),
                        field: "score",
                    })?;
                Ok(SearchHit {
                    source: chunk.chunk_metadata.source,
                    topic: chunk.chunk_metadata.topic,
                    content: chunk.content,
                    score,
                })
            })
            .collect()
    }

    /// Content of the first choice. An empty answer is an error.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        settings: &ChatSettings,
    ) -> Result<String, ClientError> {
        let payload = ChatCompletionRequest {
            model,
            messages,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        };
        let rb = self.request(Method::POST, CHAT_COMPLETIONS).json(&payload);
        let parsed: ChatCompletionResponse = self.send_json(rb, CHAT_COMPLETIONS).await?;
        let choice = parsed.choices.into_iter().next().ok_or(ClientError::MissingField {
            endpoint: CHAT_COMPLETIONS.to_string(),
            field: "choices",
        })?;
        if choice.message.content.is_empty() {
            return Err(ClientError::MissingField {
                endpoint: CHAT_COMPLETIONS.to_string(),
                field: "choices[0].message.content",
            });
        }
        Ok(choice.message.content)
    }
}

/// Place each embedding at the slot its `index` names.
fn order_by_index(data: Vec<EmbeddingDatum>, n: usize) -> Result<Vec<Vec<f32>>, ClientError> {
    let inconsistent = |detail: String| ClientError::InconsistentResponse {
        endpoint: EMBEDDINGS.to_string(),
        detail,
    };
    let mut slots: Vec<Option<Vec<f32>>> = vec![None; n];
    for d in data {
        let Some(i) = d.index else {
            return Err(inconsistent("an embedding without an index".to_string()));
        };
        match slots.get_mut(i) {
            None => return Err(inconsistent(format!("embedding index {i} outside 0..{n}"))),
            Some(slot) if slot.is_some() => {
                return Err(inconsistent(format!("embedding index {i} more than once")));
            }
            Some(slot) => *slot = Some(d.embedding),
        }
    }
    Ok(slots.into_iter().flatten().collect())
}
