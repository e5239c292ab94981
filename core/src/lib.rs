//! Root of the `stackrag-core` library.

pub mod client;
pub mod config;
pub mod config_types;
pub mod error;
pub mod protocol;
pub mod rag;

pub use client::LlamaStackClient;
pub use config::{Config, ConfigOverrides};
pub use config_types::SearchMode;
pub use error::{ClientError, ConfigError, CoreError};
pub use rag::{Answer, QueryOutcome, RagPipeline};
