//! SQLite summary store implementation.

use botmem_core::memory::store::{DEFAULT_SUMMARY_LIST_LIMIT, SummaryRepository, effective_limit};
use botmem_types::error::RepositoryError;
use botmem_types::memory::Summary;
use chrono::Utc;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `SummaryRepository`.
#[derive(Clone)]
pub struct SqliteSummaryStore {
    pool: DatabasePool,
}

impl SqliteSummaryStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct SummaryRow {
    id: i64,
    level: i64,
    content: String,
    source_ids: String,
    created_at: String,
}

impl SummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            level: row.try_get("level")?,
            content: row.try_get("content")?,
            source_ids: row.try_get("source_ids")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_summary(self) -> Result<Summary, RepositoryError> {
        let level = u32::try_from(self.level)
            .map_err(|_| RepositoryError::Query(format!("invalid summary level: {}", self.level)))?;
        Ok(Summary {
            id: self.id,
            level,
            content: self.content,
            source_ids: self.source_ids,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn row_to_summary(row: &sqlx::sqlite::SqliteRow) -> Result<Summary, RepositoryError> {
    SummaryRow::from_row(row)
        .map_err(query_error("decode summary"))?
        .into_summary()
}

impl SummaryRepository for SqliteSummaryStore {
    async fn add(
        &self,
        level: u32,
        content: &str,
        source_ids: &str,
    ) -> Result<Summary, RepositoryError> {
        let now = format_datetime(&Utc::now());

        let row = sqlx::query(
            "INSERT INTO conversation_summaries (level, content, source_ids, created_at) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(i64::from(level))
        .bind(content)
        .bind(source_ids)
        .bind(&now)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(query_error("add summary"))?;

        Ok(Summary {
            id: row.try_get("id").map_err(query_error("add summary"))?,
            level,
            content: content.to_string(),
            source_ids: source_ids.to_string(),
            created_at: parse_datetime(&now)?,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Summary, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, level, content, source_ids, created_at \
             FROM conversation_summaries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error("get summary"))?;

        match row {
            Some(row) => row_to_summary(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn list(&self, level: u32, limit: i64) -> Result<Vec<Summary>, RepositoryError> {
        let limit = effective_limit(limit, DEFAULT_SUMMARY_LIST_LIMIT);

        let rows = sqlx::query(
            "SELECT id, level, content, source_ids, created_at FROM conversation_summaries \
             WHERE level = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(level))
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error("list summaries"))?;

        rows.iter().map(row_to_summary).collect()
    }

    async fn count_at_level(&self, level: u32) -> Result<i64, RepositoryError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM conversation_summaries WHERE level = ?")
                .bind(i64::from(level))
                .fetch_one(&self.pool.reader)
                .await
                .map_err(query_error("count summaries"))?;
        Ok(row.0)
    }
}
