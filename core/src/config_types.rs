//! Types used to define the fields of [`crate::config::Config`].

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

/// Where similarity search happens.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq, Eq, Default, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SearchMode {
    /// Documents are inserted into a server-side vector store, which ranks
    /// them against the query text.
    #[default]
    #[serde(alias = "vector_store", alias = "remote")]
    VectorStore,
    /// Documents and queries are embedded remotely and ranked in-process by
    /// cosine similarity.
    Local,
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector-store" | "vector_store" | "remote" => Ok(Self::VectorStore),
            "local" => Ok(Self::Local),
            other => Err(format!(
                "unknown search mode `{other}` (expected `local` or `vector-store`)"
            )),
        }
    }
}

/// Server-side vector store used by [`SearchMode::VectorStore`].
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct VectorStoreSettings {
    #[serde(default = "default_vector_store_name")]
    pub name: String,

    #[serde(default = "default_provider_id")]
    pub provider_id: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self { name: default_vector_store_name(), provider_id: default_provider_id() }
    }
}

fn default_vector_store_name() -> String {
    "rag-demo-kb".to_string()
}

fn default_provider_id() -> String {
    "milvus-remote".to_string()
}

/// Sampling parameters sent with every chat completion.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatSettings {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { max_tokens: default_max_tokens(), temperature: default_temperature() }
    }
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_mode_round_trips_through_display() {
        for mode in [SearchMode::Local, SearchMode::VectorStore] {
            assert_eq!(mode.to_string().parse::<SearchMode>(), Ok(mode));
        }
        assert_eq!(SearchMode::VectorStore.to_string(), "vector-store");
        assert!("milvus".parse::<SearchMode>().is_err());
    }

    #[derive(Deserialize)]
    struct ModeOnly {
        search_mode: SearchMode,
    }

    #[test]
    fn config_file_accepts_the_same_mode_names_as_the_command_line() {
        for name in ["vector-store", "vector_store", "remote", "local"] {
            let parsed: ModeOnly = toml::from_str(&format!("search_mode = \"{name}\"")).unwrap();
            assert_eq!(parsed.search_mode, name.parse::<SearchMode>().unwrap());
        }
    }
}
