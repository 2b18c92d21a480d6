//! SQLite block store implementation.
//!
//! Implements `BlockRepository` from `botmem-core` over the `memory_blocks` table.

use botmem_core::memory::store::BlockRepository;
use botmem_types::error::RepositoryError;
use botmem_types::memory::{Block, CORE_BLOCK_TYPE};
use chrono::Utc;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

const BLOCK_COLUMNS: &str = "id, label, block_type, content, created_at, updated_at";

/// SQLite-backed implementation of `BlockRepository`.
#[derive(Clone)]
pub struct SqliteBlockStore {
    pool: DatabasePool,
}

impl SqliteBlockStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct BlockRow {
    id: i64,
    label: String,
    block_type: String,
    content: String,
    created_at: String,
    updated_at: String,
}

impl BlockRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            label: row.try_get("label")?,
            block_type: row.try_get("block_type")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_block(self) -> Result<Block, RepositoryError> {
        Ok(Block {
            id: self.id,
            label: self.label,
            block_type: self.block_type,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn row_to_block(row: &sqlx::sqlite::SqliteRow) -> Result<Block, RepositoryError> {
    BlockRow::from_row(row)
        .map_err(query_error("decode block"))?
        .into_block()
}

impl BlockRepository for SqliteBlockStore {
    async fn create(
        &self,
        label: &str,
        block_type: &str,
        content: &str,
    ) -> Result<Block, RepositoryError> {
        let block_type = if block_type.is_empty() {
            CORE_BLOCK_TYPE
        } else {
            block_type
        };
        let now = Utc::now();
        let now_str = format_datetime(&now);

        let row = sqlx::query(
            "INSERT INTO memory_blocks (label, block_type, content, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(label)
        .bind(block_type)
        .bind(content)
        .bind(&now_str)
        .bind(&now_str)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(format!("block '{label}' already exists"))
            }
            _ => RepositoryError::Query(format!("create block: {e}")),
        })?;

        Ok(Block {
            id: row.try_get("id").map_err(query_error("create block"))?,
            label: label.to_string(),
            block_type: block_type.to_string(),
            content: content.to_string(),
            created_at: parse_datetime(&now_str)?,
            updated_at: parse_datetime(&now_str)?,
        })
    }

    async fn get_by_label(&self, label: &str) -> Result<Block, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {BLOCK_COLUMNS} FROM memory_blocks WHERE label = ?"
        ))
        .bind(label)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error("get block"))?;

        match row {
            Some(row) => row_to_block(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Block, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {BLOCK_COLUMNS} FROM memory_blocks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error("get block"))?;

        match row {
            Some(row) => row_to_block(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn update(&self, label: &str, content: &str) -> Result<Block, RepositoryError> {
        let now = format_datetime(&Utc::now());

        let row = sqlx::query(&format!(
            "UPDATE memory_blocks SET content = ?, updated_at = ? WHERE label = ? \
             RETURNING {BLOCK_COLUMNS}"
        ))
        .bind(content)
        .bind(&now)
        .bind(label)
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(query_error("update block"))?;

        match row {
            Some(row) => row_to_block(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, label: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM memory_blocks WHERE label = ?")
            .bind(label)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error("delete block"))?;
        Ok(())
    }

    async fn list(&self, block_type: &str) -> Result<Vec<Block>, RepositoryError> {
        let result = if block_type.is_empty() {
            sqlx::query(&format!(
                "SELECT {BLOCK_COLUMNS} FROM memory_blocks ORDER BY label"
            ))
            .fetch_all(&self.pool.reader)
            .await
        } else {
            sqlx::query(&format!(
                "SELECT {BLOCK_COLUMNS} FROM memory_blocks WHERE block_type = ? ORDER BY label"
            ))
            .bind(block_type)
            .fetch_all(&self.pool.reader)
            .await
        };
        let rows = result.map_err(query_error("list blocks"))?;

        rows.iter().map(row_to_block).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_support::test_pool;

    #[tokio::test]
    async fn test_create_and_get() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        let created = store.create("human", "core", "Name: Stuart").await.unwrap();
        assert_eq!(created.label, "human");

        let fetched = store.get_by_label("human").await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.content, "Name: Stuart");
        assert_eq!(fetched.block_type, "core");

        let by_id = store.get_by_id(created.id).await.unwrap();
        assert_eq!(by_id.label, "human");
    }

    #[tokio::test]
    async fn test_create_duplicate_label_conflicts() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        store.create("human", "core", "a").await.unwrap();
        let err = store.create("human", "archival", "b").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_create_empty_type_defaults_to_core() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        let block = store.create("persona", "", "Moltbot").await.unwrap();
        assert_eq!(block.block_type, CORE_BLOCK_TYPE);
        assert_eq!(store.list("core").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        assert!(matches!(
            store.get_by_label("nope").await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(store.get_by_id(42).await, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        let created = store.create("context", "core", "v1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = store.update("context", "v2").await.unwrap();

        assert_eq!(updated.content, "v2");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        let err = store.update("missing", "x").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        store.create("human", "core", "x").await.unwrap();
        store.delete("human").await.unwrap();
        store.delete("human").await.unwrap();
        store.delete("never-existed").await.unwrap();
        assert!(store.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_by_label() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        store.create("persona", "core", "p").await.unwrap();
        store.create("notes", "archival", "n").await.unwrap();
        store.create("human", "core", "h").await.unwrap();

        let core: Vec<String> = store
            .list("core")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(core, vec!["human", "persona"]);

        let all: Vec<String> = store
            .list("")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(all, vec!["human", "notes", "persona"]);
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteBlockStore::new(pool);

        let first = store.set("human", "v1").await.unwrap();
        let second = store.set("human", "v2").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.get_by_label("human").await.unwrap().content, "v2");
    }
}
