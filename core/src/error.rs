use std::path::PathBuf;

use reqwest::StatusCode;
use stackrag_memory::DomainError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no base URL configured; pass --base-url or set `base_url` in config.toml")]
    MissingBaseUrl,

    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures talking to the inference server.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {endpoint} is missing `{field}`")]
    MissingField { endpoint: String, field: &'static str },

    #[error("{endpoint} returned {got} {what}, expected {expected}")]
    UnexpectedCount {
        endpoint: String,
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{endpoint} returned {detail}")]
    InconsistentResponse { endpoint: String, detail: String },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("ranking failed: {0}")]
    Domain(#[from] DomainError),
}
