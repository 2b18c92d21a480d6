use std::fmt;

use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in botmem-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// The four memory stores, used to name the store behind a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Block,
    Archival,
    Graph,
    Summary,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Block => write!(f, "block"),
            StoreKind::Archival => write!(f, "archival"),
            StoreKind::Graph => write!(f, "graph"),
            StoreKind::Summary => write!(f, "summary"),
        }
    }
}

/// Failure while assembling the context payload. Never carries a partial payload.
#[derive(Debug, Error)]
#[error("context assembly failed reading {store} store: {source}")]
pub struct ContextError {
    pub store: StoreKind,
    #[source]
    pub source: RepositoryError,
}

/// Errors from the extraction pipeline, one variant per failing stage.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("backend '{backend}' failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: LlmError,
    },

    #[error("extraction result does not match schema: {message}\nraw: {raw}")]
    Schema { message: String, raw: String },

    #[error("{store} store write failed: {source}")]
    Store {
        store: StoreKind,
        #[source]
        source: RepositoryError,
    },
}

/// Errors loading or saving `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config found at {0} -- run 'botmem init' to set up")]
    Missing(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Config problems stop an extraction run before any backend is contacted.
impl From<ConfigError> for IngestError {
    fn from(err: ConfigError) -> Self {
        IngestError::Configuration(err.to_string())
    }
}
