use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::embedding::DomainError;
use crate::knn::rank;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: String,
    pub topic: String,
    /// Any further labels carried along with the document.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// A knowledge-base entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(
        content: impl Into<String>,
        source: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                topic: topic.into(),
                extra: BTreeMap::new(),
            },
        }
    }

    /// First `max_chars` characters, with `...` appended when truncated.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.content.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.content[..cut]),
            None => self.content.clone(),
        }
    }
}

/// One retrieved chunk, whichever retrieval path produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub source: String,
    pub topic: Option<String>,
    pub content: String,
    pub score: f32,
}

/// Documents held in memory alongside their embeddings, searched by brute
/// force.
#[derive(Debug, Clone)]
pub struct EmbeddedCorpus {
    documents: Vec<Document>,
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

impl EmbeddedCorpus {
    /// Pair `documents[i]` with `vectors[i]`. All vectors must share one
    /// positive dimension.
    pub fn new(documents: Vec<Document>, vectors: Vec<Vec<f32>>) -> Result<Self, DomainError> {
        if documents.len() != vectors.len() {
            return Err(DomainError::CountMismatch {
                candidates: documents.len(),
                vectors: vectors.len(),
            });
        }
        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        if !vectors.is_empty() && dim == 0 {
            return Err(DomainError::EmptyVector);
        }
        if let Some((index, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(DomainError::DimensionMismatch {
                expected: dim,
                got: v.len(),
                index: Some(index),
            });
        }
        Ok(Self { documents, vectors, dim })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Embedding dimension, or 0 for an empty corpus.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn search(&self, query_vec: &[f32], top_k: usize) -> Result<Vec<SearchHit>, DomainError> {
        let ranked = rank(query_vec, &self.vectors, &self.documents, top_k)?;
        Ok(ranked
            .into_iter()
            .map(|r| SearchHit {
                source: r.item.metadata.source.clone(),
                topic: Some(r.item.metadata.topic.clone()),
                content: r.item.content.clone(),
                score: r.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corpus() -> EmbeddedCorpus {
        EmbeddedCorpus::new(
            vec![
                Document::new("platform text", "overview", "platform"),
                Document::new("rag text", "rag_explanation", "rag"),
                Document::new("vector text", "vector_db_info", "vector_database"),
            ],
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.6, 0.8]],
        )
        .unwrap()
    }

    #[test]
    fn search_returns_hits_in_score_order() {
        let hits = corpus().search(&[0.0, 1.0, 0.1], 2).unwrap();
        let sources: Vec<&str> = hits.iter().map(|h| h.source.as_str()).collect();
        assert_eq!(sources, vec!["rag_explanation", "vector_db_info"]);
        assert_eq!(hits[0].topic.as_deref(), Some("rag"));
        assert_eq!(hits[0].content, "rag text");
    }

    #[test]
    fn query_of_wrong_dimension_is_rejected() {
        let err = corpus().search(&[1.0, 0.0], 2).unwrap_err();
        assert_eq!(
            err,
            DomainError::DimensionMismatch { expected: 2, got: 3, index: Some(0) }
        );
    }

    #[test]
    fn ragged_vectors_are_rejected_on_construction() {
        let err = EmbeddedCorpus::new(
            vec![Document::new("a", "a", "t"), Document::new("b", "b", "t")],
            vec![vec![1.0, 0.0], vec![1.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::DimensionMismatch { expected: 2, got: 1, index: Some(1) }
        );
    }

    #[test]
    fn empty_corpus_searches_to_nothing() {
        let c = EmbeddedCorpus::new(Vec::new(), Vec::new()).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.dim(), 0);
        assert!(c.search(&[1.0], 3).unwrap().is_empty());
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let d = Document::new("héllo world", "s", "t");
        assert_eq!(d.preview(5), "héllo...");
        assert_eq!(d.preview(80), "héllo world");
    }

    #[test]
    fn metadata_keeps_extra_labels() {
        let d: Document = serde_json::from_value(serde_json::json!({
            "content": "x",
            "metadata": {"source": "s", "topic": "t", "lang": "en"}
        }))
        .unwrap();
        assert_eq!(d.metadata.extra.get("lang").map(String::as_str), Some("en"));
    }
}
