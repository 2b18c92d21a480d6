//! Wiring for the extraction pipeline and context assembler over SQLite.
//!
//! Everything environment-dependent (config file, API key) is resolved here
//! and handed to `botmem-core` as plain values.

use std::path::Path;

use botmem_core::context::ContextAssembler;
use botmem_core::ingest::IngestPipeline;
use botmem_core::llm::box_provider::BoxLlmProvider;
use botmem_core::memory::box_embedder::BoxEmbedder;
use botmem_types::config::AppConfig;
use botmem_types::error::IngestError;

use crate::config::load_config;
use crate::embedding::create_embedder;
use crate::llm::create_provider;
use crate::secret::resolve_api_key;
use crate::sqlite::archival::SqliteArchivalStore;
use crate::sqlite::block::SqliteBlockStore;
use crate::sqlite::graph::SqliteGraphStore;
use crate::sqlite::pool::DatabasePool;
use crate::sqlite::summary::SqliteSummaryStore;

pub type SqliteIngestPipeline =
    IngestPipeline<SqliteBlockStore, SqliteArchivalStore, SqliteGraphStore, SqliteSummaryStore>;

pub type SqliteContextAssembler =
    ContextAssembler<SqliteBlockStore, SqliteSummaryStore, SqliteGraphStore>;

/// Build the pipeline from configuration: backend, optional embedder and the four stores.
pub fn build_pipeline(
    config: &AppConfig,
    pool: &DatabasePool,
) -> Result<SqliteIngestPipeline, IngestError> {
    let provider = create_provider(&config.llm, resolve_api_key(&config.llm))?;
    let embedder = create_embedder(&config.embeddings);
    Ok(pipeline_with(provider, embedder, pool))
}

/// Load `config.toml` from `data_dir` and build the pipeline from it.
///
/// A missing or unreadable config is an `IngestError::Configuration`.
pub async fn load_pipeline(
    data_dir: &Path,
    pool: &DatabasePool,
) -> Result<SqliteIngestPipeline, IngestError> {
    let config = load_config(data_dir).await?;
    build_pipeline(&config, pool)
}

/// Build the pipeline around an already-constructed backend.
pub fn pipeline_with(
    provider: BoxLlmProvider,
    embedder: Option<BoxEmbedder>,
    pool: &DatabasePool,
) -> SqliteIngestPipeline {
    IngestPipeline::new(
        provider,
        embedder,
        SqliteBlockStore::new(pool.clone()),
        SqliteArchivalStore::new(pool.clone()),
        SqliteGraphStore::new(pool.clone()),
        SqliteSummaryStore::new(pool.clone()),
    )
}

pub fn context_assembler(pool: &DatabasePool) -> SqliteContextAssembler {
    ContextAssembler::new(
        SqliteBlockStore::new(pool.clone()),
        SqliteSummaryStore::new(pool.clone()),
        SqliteGraphStore::new(pool.clone()),
    )
}
