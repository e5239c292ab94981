use stackrag_memory::{Document, EmbeddedCorpus, SearchHit};
use tracing::{debug, info, warn};

use crate::client::LlamaStackClient;
use crate::config::Config;
use crate::config_types::SearchMode;
use crate::error::Result;
use crate::protocol::{ChatMessage, Chunk, ChunkMetadata, CreateVectorStoreRequest};

/// Where retrieval for this run happens, set up by [`RagPipeline::prepare`].
#[derive(Debug)]
pub enum Retriever {
    Local(EmbeddedCorpus),
    VectorStore { id: String },
}

/// What the chat model made of the retrieved context.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Retrieval found nothing, so no chat call was made.
    Skipped,
    Generated(String),
    /// The chat call failed; the hits are still valid.
    Failed(String),
}

/// Result of answering one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub answer: Answer,
}

pub struct RagPipeline<'a> {
    client: &'a LlamaStackClient,
    config: &'a Config,
    retriever: Retriever,
}

impl<'a> RagPipeline<'a> {
    /// Embed the configured documents and make them searchable through the
    /// configured [`SearchMode`].
    pub async fn prepare(client: &'a LlamaStackClient, config: &'a Config) -> Result<Self> {
        let texts: Vec<String> = config.documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = client.embed(&texts, &config.embedding_model).await?;
        info!(documents = embeddings.len(), "embedded knowledge base");

        let retriever = match config.search_mode {
            SearchMode::Local => {
                Retriever::Local(EmbeddedCorpus::new(config.documents.clone(), embeddings)?)
            }
            SearchMode::VectorStore => {
                let dim = embeddings.first().map(Vec::len).unwrap_or(config.embedding_dimension);
                if dim != config.embedding_dimension {
                    info!(
                        configured = config.embedding_dimension,
                        actual = dim,
                        "using embedding dimension reported by the server"
                    );
                }
                let request = CreateVectorStoreRequest {
                    vector_store_id: &config.vector_store.name,
                    embedding_model: &config.embedding_model,
                    embedding_dimension: dim,
                    provider_id: &config.vector_store.provider_id,
                };
                let id = client.create_vector_store(&request).await?;
                info!(vector_store = %id, "created vector store");

                let chunks = build_chunks(&config.documents, embeddings, &config.embedding_model);
                client.insert_chunks(&id, &chunks).await?;
                info!(vector_store = %id, chunks = chunks.len(), "inserted chunks");
                Retriever::VectorStore { id }
            }
        };

        Ok(Self { client, config, retriever })
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Top-k hits for `query`, best first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>> {
        let hits = match &self.retriever {
            Retriever::Local(corpus) => {
                let texts = [query.to_string()];
                let vectors = self.client.embed(&texts, &self.config.embedding_model).await?;
                let query_vec = vectors.first().map(Vec::as_slice).unwrap_or_default();
                corpus.search(query_vec, self.config.top_k)?
            }
            Retriever::VectorStore { id } => {
                self.client.query_chunks(id, query, self.config.top_k).await?
            }
        };
        debug!(query, hits = hits.len(), "retrieved");
        Ok(hits)
    }

    /// Retrieve context for `query` and ask the chat model to answer it.
    ///
    /// Only retrieval failures are errors. A failed chat call is recorded as
    /// [`Answer::Failed`] next to the hits.
    pub async fn answer(&self, query: &str) -> Result<QueryOutcome> {
        let hits = self.retrieve(query).await?;
        if hits.is_empty() {
            return Ok(QueryOutcome { query: query.to_string(), hits, answer: Answer::Skipped });
        }
        let context = build_context(&hits, self.config.context_documents);
        let messages = chat_messages(query, &context);
        let answer = match self
            .client
            .chat_completion(&self.config.inference_model, &messages, &self.config.chat)
            .await
        {
            Ok(text) => Answer::Generated(text),
            Err(e) => {
                warn!(query, "chat completion failed: {e}");
                Answer::Failed(e.to_string())
            }
        };
        Ok(QueryOutcome { query: query.to_string(), hits, answer })
    }
}

/// Vector-store chunks for `documents`, ids formed as `{source}_{index}`.
pub fn build_chunks(
    documents: &[Document],
    embeddings: Vec<Vec<f32>>,
    embedding_model: &str,
) -> Vec<Chunk> {
    documents
        .iter()
        .zip(embeddings)
        .enumerate()
        .map(|(i, (doc, embedding))| Chunk {
            chunk_id: format!("{}_{i}", doc.metadata.source),
            content: doc.content.clone(),
            embedding_dimension: embedding.len(),
            embedding,
            embedding_model: embedding_model.to_string(),
            chunk_metadata: ChunkMetadata {
                source: doc.metadata.source.clone(),
                topic: Some(doc.metadata.topic.clone()),
            },
        })
        .collect()
}

/// Contents of the first `n` hits separated by blank lines.
pub fn build_context(hits: &[SearchHit], n: usize) -> String {
    hits.iter().take(n).map(|h| h.content.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// System message carrying `context` (omitted when empty) followed by the
/// user's question.
pub fn chat_messages(query: &str, context: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if !context.is_empty() {
        messages.push(ChatMessage::system(format!(
            "Use the following context to answer the question:\n\n{context}"
        )));
    }
    messages.push(ChatMessage::user(query));
    messages
}
