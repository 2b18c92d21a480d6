//! Memory types for botmem.
//!
//! Four independent representations share one database: working-memory
//! blocks, archival facts, an entity/relation graph, and leveled
//! conversation summaries. [`ContextPayload`] is the read-only aggregate
//! handed to an agent for prompt injection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Block type used for always-on working memory.
pub const CORE_BLOCK_TYPE: &str = "core";

/// A named slot of always-on working memory (e.g. "human", "persona").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: i64,
    /// Globally unique label.
    pub label: String,
    pub block_type: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One atomic long-term fact. Never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivalEntry {
    pub id: i64,
    pub content: String,
    /// Tags joined with `,`. Empty string when the fact has no tags.
    pub tags: String,
    /// Little-endian f32 vector, `dimension * 4` bytes.
    #[serde(skip)]
    pub embedding: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

impl ArchivalEntry {
    /// Split the stored tag string back into individual tags.
    pub fn tag_list(&self) -> Vec<&str> {
        if self.tags.is_empty() {
            return Vec::new();
        }
        self.tags.split(',').collect()
    }
}

/// A node of the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    /// Globally unique name, regardless of type.
    pub name: String,
    pub entity_type: String,
    pub created_at: DateTime<Utc>,
}

/// A directed, labeled edge of the knowledge graph with endpoint names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: i64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metadata: String,
    pub created_at: DateTime<Utc>,
}

/// A leveled compression of conversation history.
///
/// Level 0 is the most granular; higher levels are summaries of summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub id: i64,
    pub level: u32,
    pub content: String,
    /// Free-form provenance string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_ids: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate of current memory state, rendered as JSON for prompt injection.
///
/// `core_blocks` is always present; the other arrays are omitted when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPayload {
    pub core_blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_summaries: Vec<Summary>,
    #[serde(default, rename = "key_relations", skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
}

impl ContextPayload {
    /// Pretty-printed JSON form of the payload.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
