use std::path::{Path, PathBuf};

use serde::Deserialize;
use stackrag_memory::Document;

use crate::config_types::{ChatSettings, SearchMode, VectorStoreSettings};
use crate::error::ConfigError;

pub const CONFIG_TOML_FILE: &str = "config.toml";

pub const DEFAULT_EMBEDDING_MODEL: &str = "vllm-embedding/nomic-ai/nomic-embed-text-v1.5";
pub const DEFAULT_INFERENCE_MODEL: &str = "vllm-inference/llama-3-2-3b";

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root of the inference server, without a trailing slash.
    pub base_url: String,

    /// Pre-issued bearer token, sent verbatim when present.
    pub api_token: Option<String>,

    pub embedding_model: String,
    pub inference_model: String,

    /// Dimension requested when the vector store is created. Overridden by
    /// the dimension of the embeddings actually returned.
    pub embedding_dimension: usize,

    pub search_mode: SearchMode,

    /// Hits retrieved per query.
    pub top_k: usize,

    /// Leading hits whose content is passed to the chat model.
    pub context_documents: usize,

    pub health_timeout_secs: u64,

    pub vector_store: VectorStoreSettings,
    pub chat: ChatSettings,

    /// Knowledge base embedded at startup.
    pub documents: Vec<Document>,

    /// Questions asked by `demo`.
    pub queries: Vec<String>,
}

/// Raw contents of `config.toml`. Every field is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigToml {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub embedding_model: Option<String>,
    pub inference_model: Option<String>,
    pub embedding_dimension: Option<usize>,
    pub search_mode: Option<SearchMode>,
    pub top_k: Option<usize>,
    pub context_documents: Option<usize>,
    pub health_timeout_secs: Option<u64>,
    #[serde(default)]
    pub vector_store: VectorStoreSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    pub documents: Option<Vec<Document>>,
    pub queries: Option<Vec<String>>,
}

impl ConfigToml {
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::Read { path: path.to_path_buf(), source: e }),
        };
        let parsed = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), source: e })?;
        Ok(Some(parsed))
    }
}

/// Optional overrides supplied on the command line. These take precedence
/// over `config.toml`.
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub embedding_model: Option<String>,
    pub inference_model: Option<String>,
    pub search_mode: Option<SearchMode>,
    pub top_k: Option<usize>,
}

impl Config {
    /// Load `config.toml` from `config_path`, or from the stackrag home
    /// directory when `None`, and apply `overrides` on top.
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let cfg = match config_path {
            Some(path) => ConfigToml::load(path)?
                .ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?,
            None => {
                let path = find_stackrag_home()?.join(CONFIG_TOML_FILE);
                ConfigToml::load(&path)?.unwrap_or_default()
            }
        };
        Self::load_from_base_config_with_overrides(cfg, overrides)
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let ConfigOverrides {
            base_url,
            api_token,
            embedding_model,
            inference_model,
            search_mode,
            top_k,
        } = overrides;

        let base_url = base_url
            .or(cfg.base_url)
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let config = Self {
            base_url,
            api_token: api_token.or(cfg.api_token).filter(|t| !t.trim().is_empty()),
            embedding_model: embedding_model
                .or(cfg.embedding_model)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            inference_model: inference_model
                .or(cfg.inference_model)
                .unwrap_or_else(|| DEFAULT_INFERENCE_MODEL.to_string()),
            embedding_dimension: cfg.embedding_dimension.unwrap_or(768),
            search_mode: search_mode.or(cfg.search_mode).unwrap_or_default(),
            top_k: top_k.or(cfg.top_k).unwrap_or(3),
            context_documents: cfg.context_documents.unwrap_or(2),
            health_timeout_secs: cfg.health_timeout_secs.unwrap_or(10),
            vector_store: cfg.vector_store,
            chat: cfg.chat,
            documents: cfg.documents.unwrap_or_else(default_documents),
            queries: cfg.queries.unwrap_or_else(default_queries),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be greater than zero".into()));
        }
        if self.embedding_dimension == 0 {
            return Err(ConfigError::Invalid(
                "embedding_dimension must be greater than zero".into(),
            ));
        }
        if self.documents.is_empty() {
            return Err(ConfigError::Invalid("at least one document is required".into()));
        }
        if let Some(i) = self.documents.iter().position(|d| d.content.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("document {} has no content", i + 1)));
        }
        Ok(())
    }
}

/// Returns the path to the stackrag configuration directory, which can be
/// specified by the `STACKRAG_HOME` environment variable. If not set,
/// defaults to `~/.stackrag`.
///
/// - If `STACKRAG_HOME` is set, the directory must exist.
/// - If `STACKRAG_HOME` is not set, this function does not verify that the
///   directory exists.
pub fn find_stackrag_home() -> Result<PathBuf, ConfigError> {
    if let Ok(val) = std::env::var("STACKRAG_HOME") {
        if !val.is_empty() {
            let p = PathBuf::from(val);
            return std::fs::canonicalize(&p)
                .map_err(|e| ConfigError::Read { path: p, source: e });
        }
    }
    let mut p = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    p.push(".stackrag");
    Ok(p)
}

pub fn default_documents() -> Vec<Document> {
    vec![
        Document::new(
            "Red Hat OpenShift AI is a flexible, scalable AI/ML platform that enables data \
             scientists and developers to build, deploy, and monitor AI-enabled applications. It \
             provides tools for the full machine learning lifecycle.",
            "rhoai_overview",
            "platform",
        ),
        Document::new(
            "LlamaStack is an open-source framework that provides standardized APIs for building \
             AI applications. It supports various AI capabilities including inference, RAG \
             (Retrieval-Augmented Generation), and agent-based workflows.",
            "llamastack_intro",
            "framework",
        ),
        Document::new(
            "The RAG (Retrieval-Augmented Generation) pattern combines vector search with large \
             language models to provide contextually relevant answers. Documents are embedded \
             into vectors, stored in a vector database, and retrieved to augment LLM prompts.",
            "rag_explanation",
            "rag",
        ),
        Document::new(
            "Vector databases like Milvus store high-dimensional embeddings and enable \
             similarity search. They are essential for RAG applications, allowing efficient \
             retrieval of relevant documents based on semantic similarity.",
            "vector_db_info",
            "vector_database",
        ),
        Document::new(
            "Red Hat OpenShift AI integrates with various open-source tools including Jupyter \
             notebooks, TensorFlow, PyTorch, and provides enterprise-grade security, \
             scalability, and support for production AI workloads.",
            "rhoai_features",
            "platform",
        ),
    ]
}

pub fn default_queries() -> Vec<String> {
    [
        "What is Red Hat OpenShift AI?",
        "How does RAG work?",
        "What is a vector database used for?",
        "What tools does OpenShift AI support?",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
