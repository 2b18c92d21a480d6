//! Application state wiring the four memory stores over one database.

use std::path::{Path, PathBuf};

use botmem_infra::filesystem::{default_db_path, resolve_data_dir};
use botmem_infra::sqlite::archival::SqliteArchivalStore;
use botmem_infra::sqlite::block::SqliteBlockStore;
use botmem_infra::sqlite::graph::SqliteGraphStore;
use botmem_infra::sqlite::pool::DatabasePool;
use botmem_infra::sqlite::summary::SqliteSummaryStore;

/// Shared state for CLI command handlers.
pub struct AppState {
    pub blocks: SqliteBlockStore,
    pub archival: SqliteArchivalStore,
    pub graph: SqliteGraphStore,
    pub summaries: SqliteSummaryStore,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Open (and migrate) the database, then wire the stores.
    ///
    /// `db_override` replaces the default `{data_dir}/botmem.db`.
    pub async fn init(db_override: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let db_path = db_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_db_path(&data_dir));

        tracing::debug!(path = %db_path.display(), "opening memory database");
        let db_pool = DatabasePool::open(&db_path).await?;

        Ok(Self {
            blocks: SqliteBlockStore::new(db_pool.clone()),
            archival: SqliteArchivalStore::new(db_pool.clone()),
            graph: SqliteGraphStore::new(db_pool.clone()),
            summaries: SqliteSummaryStore::new(db_pool.clone()),
            data_dir,
            db_pool,
        })
    }
}
