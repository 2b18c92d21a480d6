//! SQLite graph store implementation.
//!
//! Entities are unique by name. Relations reference entities by id and are
//! unique on (subject, predicate, object); re-inserting either is a no-op.

use botmem_core::memory::store::GraphRepository;
use botmem_types::error::RepositoryError;
use botmem_types::memory::{Entity, Relation};
use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

const RELATION_SELECT: &str = "SELECT r.id, s.name AS subject, r.predicate, o.name AS object, \
     r.metadata, r.created_at \
     FROM relations r \
     JOIN entities s ON s.id = r.subject_id \
     JOIN entities o ON o.id = r.object_id";

/// SQLite-backed implementation of `GraphRepository`.
#[derive(Clone)]
pub struct SqliteGraphStore {
    pool: DatabasePool,
}

impl SqliteGraphStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct RelationRow {
    id: i64,
    subject: String,
    predicate: String,
    object: String,
    metadata: String,
    created_at: String,
}

impl RelationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            subject: row.try_get("subject")?,
            predicate: row.try_get("predicate")?,
            object: row.try_get("object")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_relation(self) -> Result<Relation, RepositoryError> {
        Ok(Relation {
            id: self.id,
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            metadata: self.metadata,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct EntityRow {
    id: i64,
    name: String,
    entity_type: String,
    created_at: String,
}

impl EntityRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            entity_type: row.try_get("entity_type")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_entity(self) -> Result<Entity, RepositoryError> {
        Ok(Entity {
            id: self.id,
            name: self.name,
            entity_type: self.entity_type,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn rows_to_relations(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Relation>, RepositoryError> {
    rows.iter()
        .map(|row| {
            RelationRow::from_row(row)
                .map_err(query_error("decode relation"))?
                .into_relation()
        })
        .collect()
}

/// Insert-or-ignore an entity on `conn` and return its id.
async fn ensure_entity_on(
    conn: &mut SqliteConnection,
    name: &str,
    entity_type: &str,
    now: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query(
        "INSERT INTO entities (name, entity_type, created_at) VALUES (?, ?, ?) \
         ON CONFLICT(name) DO NOTHING",
    )
    .bind(name)
    .bind(entity_type)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query("SELECT id FROM entities WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    row.try_get("id")
}

impl GraphRepository for SqliteGraphStore {
    async fn ensure_entity(&self, name: &str, entity_type: &str) -> Result<i64, RepositoryError> {
        let now = format_datetime(&Utc::now());
        let mut conn = self
            .pool
            .writer
            .acquire()
            .await
            .map_err(query_error("ensure entity"))?;

        ensure_entity_on(&mut conn, name, entity_type, &now)
            .await
            .map_err(query_error("ensure entity"))
    }

    async fn add_relation(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        metadata: &str,
    ) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(query_error("add relation"))?;

        let subject_id = ensure_entity_on(&mut tx, subject, "", &now)
            .await
            .map_err(query_error("add relation"))?;
        let object_id = ensure_entity_on(&mut tx, object, "", &now)
            .await
            .map_err(query_error("add relation"))?;

        let inserted = sqlx::query(
            "INSERT INTO relations (subject_id, predicate, object_id, metadata, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(subject_id, predicate, object_id) DO NOTHING",
        )
        .bind(subject_id)
        .bind(predicate)
        .bind(object_id)
        .bind(metadata)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(query_error("add relation"))?;

        tx.commit().await.map_err(query_error("add relation"))?;

        if inserted.rows_affected() == 0 {
            tracing::debug!(subject, predicate, object, "relation already present");
        }
        Ok(())
    }

    async fn query_entity(&self, name: &str) -> Result<Vec<Relation>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{RELATION_SELECT} WHERE s.name = ? OR o.name = ? ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(name)
        .bind(name)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error("query entity"))?;

        rows_to_relations(&rows)
    }

    async fn search_relations(&self, predicate: &str) -> Result<Vec<Relation>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{RELATION_SELECT} WHERE r.predicate LIKE ? ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(format!("%{predicate}%"))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error("search relations"))?;

        rows_to_relations(&rows)
    }

    async fn list_entities(&self, entity_type: &str) -> Result<Vec<Entity>, RepositoryError> {
        let result = if entity_type.is_empty() {
            sqlx::query("SELECT id, name, entity_type, created_at FROM entities ORDER BY name")
                .fetch_all(&self.pool.reader)
                .await
        } else {
            sqlx::query(
                "SELECT id, name, entity_type, created_at FROM entities \
                 WHERE entity_type = ? ORDER BY name",
            )
            .bind(entity_type)
            .fetch_all(&self.pool.reader)
            .await
        };
        let rows = result.map_err(query_error("list entities"))?;

        rows.iter()
            .map(|row| {
                EntityRow::from_row(row)
                    .map_err(query_error("decode entity"))?
                    .into_entity()
            })
            .collect()
    }
}
