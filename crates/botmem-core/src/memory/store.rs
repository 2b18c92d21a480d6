//! Store trait definitions for the four memory representations.
//!
//! Each trait owns exactly one table group. Implementations live in
//! botmem-infra (e.g., `SqliteBlockStore`). Uses native async fn in traits
//! (RPITIT, Rust 2024 edition).

use std::future::Future;

use botmem_types::error::RepositoryError;
use botmem_types::memory::{ArchivalEntry, Block, Entity, Relation, Summary, CORE_BLOCK_TYPE};

/// Default `search` limit when the caller passes a non-positive value.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
/// Default archival `list` limit.
pub const DEFAULT_ARCHIVAL_LIST_LIMIT: i64 = 50;
/// Default summary `list` limit.
pub const DEFAULT_SUMMARY_LIST_LIMIT: i64 = 20;

/// Replace a non-positive limit with `default`.
pub fn effective_limit(limit: i64, default: i64) -> i64 {
    if limit <= 0 { default } else { limit }
}

/// Working-memory blocks, unique by label.
pub trait BlockRepository: Send + Sync {
    /// Create a block. Fails with `Conflict` if the label exists.
    /// An empty `block_type` is stored as "core".
    fn create(
        &self,
        label: &str,
        block_type: &str,
        content: &str,
    ) -> impl Future<Output = Result<Block, RepositoryError>> + Send;

    /// Fails with `NotFound` if the label is absent.
    fn get_by_label(
        &self,
        label: &str,
    ) -> impl Future<Output = Result<Block, RepositoryError>> + Send;

    fn get_by_id(&self, id: i64) -> impl Future<Output = Result<Block, RepositoryError>> + Send;

    /// Replace the content and refresh `updated_at`. Fails with `NotFound` if absent.
    fn update(
        &self,
        label: &str,
        content: &str,
    ) -> impl Future<Output = Result<Block, RepositoryError>> + Send;

    /// Idempotent: deleting an absent label succeeds.
    fn delete(&self, label: &str) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Blocks ordered by label ascending. An empty filter returns all types.
    fn list(
        &self,
        block_type: &str,
    ) -> impl Future<Output = Result<Vec<Block>, RepositoryError>> + Send;

    /// Update the block if it exists, otherwise create it as a "core" block.
    ///
    /// This is the one place `NotFound` is recovered rather than surfaced.
    fn set(
        &self,
        label: &str,
        content: &str,
    ) -> impl Future<Output = Result<Block, RepositoryError>> + Send {
        async move {
            match self.get_by_label(label).await {
                Ok(_) => self.update(label, content).await,
                Err(RepositoryError::NotFound) => {
                    self.create(label, CORE_BLOCK_TYPE, content).await
                }
                Err(e) => Err(e),
            }
        }
    }
}

/// Append-only long-term facts with a full-text index.
pub trait ArchivalRepository: Send + Sync {
    /// Store a fact. Tags are joined with `,`; no tags stores an empty string.
    fn add(
        &self,
        content: &str,
        tags: &[String],
        embedding: Option<&[u8]>,
    ) -> impl Future<Output = Result<ArchivalEntry, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<ArchivalEntry, RepositoryError>> + Send;

    /// Relevance-ranked full-text search over content and tags.
    /// No match yields an empty vector, not an error.
    fn search(
        &self,
        query: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ArchivalEntry>, RepositoryError>> + Send;

    /// Most recent first. `tag` is a substring filter; empty matches all.
    fn list(
        &self,
        tag: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ArchivalEntry>, RepositoryError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Every entry that carries an embedding, for brute-force similarity scans.
    fn all_with_embeddings(
        &self,
    ) -> impl Future<Output = Result<Vec<ArchivalEntry>, RepositoryError>> + Send;
}

/// Entity/relation knowledge graph.
pub trait GraphRepository: Send + Sync {
    /// Return the id for `name`, creating the entity if needed.
    /// On an existing name the type argument is ignored.
    fn ensure_entity(
        &self,
        name: &str,
        entity_type: &str,
    ) -> impl Future<Output = Result<i64, RepositoryError>> + Send;

    /// Insert a triple, creating both endpoints with an empty type if absent.
    /// A duplicate triple is silently absorbed.
    fn add_relation(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        metadata: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Relations where `name` is subject or object, most recent first, each once.
    fn query_entity(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<Relation>, RepositoryError>> + Send;

    /// Relations whose predicate contains `predicate`.
    fn search_relations(
        &self,
        predicate: &str,
    ) -> impl Future<Output = Result<Vec<Relation>, RepositoryError>> + Send;

    /// Entities ordered by name. An empty filter returns all types.
    fn list_entities(
        &self,
        entity_type: &str,
    ) -> impl Future<Output = Result<Vec<Entity>, RepositoryError>> + Send;
}

/// Leveled conversation summaries.
pub trait SummaryRepository: Send + Sync {
    fn add(
        &self,
        level: u32,
        content: &str,
        source_ids: &str,
    ) -> impl Future<Output = Result<Summary, RepositoryError>> + Send;

    fn get_by_id(&self, id: i64) -> impl Future<Output = Result<Summary, RepositoryError>> + Send;

    /// Most recent first, ties broken by id descending.
    fn list(
        &self,
        level: u32,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Summary>, RepositoryError>> + Send;

    fn count_at_level(&self, level: u32) -> impl Future<Output = Result<i64, RepositoryError>> + Send;
}
