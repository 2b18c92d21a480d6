//! SQLite archival store implementation.
//!
//! Facts live in `archival`; the `archival_fts` FTS5 index over content and
//! tags is maintained by triggers, so this module only writes the base table.

use botmem_core::memory::store::{
    ArchivalRepository, DEFAULT_ARCHIVAL_LIST_LIMIT, DEFAULT_SEARCH_LIMIT, effective_limit,
};
use botmem_types::error::RepositoryError;
use botmem_types::memory::ArchivalEntry;
use chrono::Utc;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ArchivalRepository`.
#[derive(Clone)]
pub struct SqliteArchivalStore {
    pool: DatabasePool,
}

impl SqliteArchivalStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ArchivalRow {
    id: i64,
    content: String,
    tags: String,
    embedding: Option<Vec<u8>>,
    created_at: String,
}

impl ArchivalRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            tags: row.try_get("tags")?,
            embedding: row.try_get("embedding")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_entry(self) -> Result<ArchivalEntry, RepositoryError> {
        Ok(ArchivalEntry {
            id: self.id,
            content: self.content,
            tags: self.tags,
            embedding: self.embedding,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn rows_to_entries(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ArchivalEntry>, RepositoryError> {
    rows.iter()
        .map(|row| {
            ArchivalRow::from_row(row)
                .map_err(query_error("decode archival"))?
                .into_entry()
        })
        .collect()
}

/// Turn free text into an FTS5 query that matches every word literally.
///
/// Each whitespace-separated token is quoted, so FTS5 operators and
/// punctuation in user input cannot produce a syntax error. Quoted tokens
/// are implicitly AND-ed.
pub fn fts_query(input: &str) -> String {
    input
        .split_whitespace()
        .map(|token| token.replace('"', ""))
        .filter(|token| !token.is_empty())
        .map(|token| format!("\"{token}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

impl ArchivalRepository for SqliteArchivalStore {
    async fn add(
        &self,
        content: &str,
        tags: &[String],
        embedding: Option<&[u8]>,
    ) -> Result<ArchivalEntry, RepositoryError> {
        let tags = tags.join(",");
        let now = format_datetime(&Utc::now());

        let row = sqlx::query(
            "INSERT INTO archival (content, tags, embedding, created_at) VALUES (?, ?, ?, ?) \
             RETURNING id",
        )
        .bind(content)
        .bind(&tags)
        .bind(embedding)
        .bind(&now)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(query_error("add archival"))?;

        Ok(ArchivalEntry {
            id: row.try_get("id").map_err(query_error("add archival"))?,
            content: content.to_string(),
            tags,
            embedding: embedding.map(<[u8]>::to_vec),
            created_at: parse_datetime(&now)?,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<ArchivalEntry, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, content, tags, embedding, created_at FROM archival WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error("get archival"))?;

        match row {
            Some(row) => ArchivalRow::from_row(&row)
                .map_err(query_error("decode archival"))?
                .into_entry(),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<ArchivalEntry>, RepositoryError> {
        let limit = effective_limit(limit, DEFAULT_SEARCH_LIMIT);
        let fts = fts_query(query);
        if fts.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT a.id, a.content, a.tags, a.embedding, a.created_at \
             FROM archival_fts f \
             JOIN archival a ON a.id = f.rowid \
             WHERE archival_fts MATCH ? \
             ORDER BY f.rank \
             LIMIT ?",
        )
        .bind(&fts)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error("search archival"))?;

        tracing::debug!(query = %fts, hits = rows.len(), "archival search");
        rows_to_entries(&rows)
    }

    async fn list(&self, tag: &str, limit: i64) -> Result<Vec<ArchivalEntry>, RepositoryError> {
        let limit = effective_limit(limit, DEFAULT_ARCHIVAL_LIST_LIMIT);

        let result = if tag.is_empty() {
            sqlx::query(
                "SELECT id, content, tags, embedding, created_at FROM archival \
                 ORDER BY created_at DESC, id DESC LIMIT ?",
            )
            .bind(limit)
            .fetch_all(&self.pool.reader)
            .await
        } else {
            sqlx::query(
                "SELECT id, content, tags, embedding, created_at FROM archival \
                 WHERE tags LIKE ? ORDER BY created_at DESC, id DESC LIMIT ?",
            )
            .bind(format!("%{tag}%"))
            .bind(limit)
            .fetch_all(&self.pool.reader)
            .await
        };
        let rows = result.map_err(query_error("list archival"))?;

        rows_to_entries(&rows)
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM archival WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error("delete archival"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn all_with_embeddings(&self) -> Result<Vec<ArchivalEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, content, tags, embedding, created_at FROM archival \
             WHERE embedding IS NOT NULL ORDER BY id",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error("list embeddings"))?;

        rows_to_entries(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_support::test_pool;
    use botmem_core::memory::vector::{deserialize_embedding, serialize_embedding};

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_add_joins_tags() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        let entry = store
            .add("Stuart prefers Go", &tags(&["preference", "programming"]), None)
            .await
            .unwrap();
        assert_eq!(entry.tags, "preference,programming");

        let fetched = store.get_by_id(entry.id).await.unwrap();
        assert_eq!(fetched.tags, "preference,programming");
        assert_eq!(fetched.tag_list(), vec!["preference", "programming"]);
        assert!(fetched.embedding.is_none());
    }

    #[tokio::test]
    async fn test_add_without_tags_stores_empty_string() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        let entry = store.add("untagged fact", &[], None).await.unwrap();
        assert_eq!(store.get_by_id(entry.id).await.unwrap().tags, "");
    }

    #[tokio::test]
    async fn test_search_ranks_matching_fact() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        for content in [
            "Stuart prefers Go for CLI tools",
            "Python is good for ML",
            "Rust has great memory safety",
        ] {
            store.add(content, &[], None).await.unwrap();
        }

        let results = store.search("Go CLI", 10).await.unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].content, "Stuart prefers Go for CLI tools");

        let none = store.search("quantum computing", 10).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_tags() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        store.add("likes coffee", &tags(&["beverage"]), None).await.unwrap();
        let results = store.search("beverage", 0).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_tolerates_fts_syntax() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        store.add("C++ and \"quotes\"", &[], None).await.unwrap();
        assert!(store.search("\"unbalanced", 10).await.is_ok());
        assert!(store.search("AND OR NOT (", 10).await.is_ok());
        assert!(store.search("   ", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        for i in 0..15 {
            store.add(&format!("rust fact {i}"), &[], None).await.unwrap();
        }
        assert_eq!(store.search("rust", 3).await.unwrap().len(), 3);
        assert_eq!(store.search("rust", -1).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_list_recency_and_tag_filter() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        let first = store.add("one", &tags(&["work"]), None).await.unwrap();
        let second = store.add("two", &tags(&["home"]), None).await.unwrap();
        let third = store.add("three", &tags(&["work", "urgent"]), None).await.unwrap();

        let all: Vec<i64> = store.list("", 0).await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(all, vec![third.id, second.id, first.id]);

        let work: Vec<i64> = store.list("work", 10).await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(work, vec![third.id, first.id]);

        assert_eq!(store.list("", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_from_index() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        let entry = store.add("ephemeral detail", &[], None).await.unwrap();
        store.delete(entry.id).await.unwrap();

        assert!(store.search("ephemeral", 10).await.unwrap().is_empty());
        assert!(matches!(store.get_by_id(entry.id).await, Err(RepositoryError::NotFound)));
        assert!(matches!(store.delete(entry.id).await, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_embeddings_round_trip() {
        let (pool, _dir) = test_pool().await;
        let store = SqliteArchivalStore::new(pool);

        let bytes = serialize_embedding(&[0.25, -1.0, 3.5]);
        store.add("with vector", &[], Some(&bytes)).await.unwrap();
        store.add("without vector", &[], None).await.unwrap();

        let embedded = store.all_with_embeddings().await.unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].content, "with vector");
        let vector = deserialize_embedding(embedded[0].embedding.as_deref().unwrap()).unwrap();
        assert_eq!(vector, vec![0.25, -1.0, 3.5]);
    }

    #[test]
    fn test_fts_query_quotes_tokens() {
        assert_eq!(fts_query("Go CLI"), "\"Go\" \"CLI\"");
        assert_eq!(fts_query("  say \"hi\" "), "\"say\" \"hi\"");
        assert_eq!(fts_query("\"\""), "");
    }
}
