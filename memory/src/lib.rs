//! Similarity ranking over in-memory embeddings.

pub mod embedding;
pub mod knn;
pub mod store;

pub use embedding::DomainError;
pub use knn::{Ranked, rank};
pub use store::{Document, DocumentMetadata, EmbeddedCorpus, SearchHit};
