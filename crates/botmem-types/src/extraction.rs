//! Extraction result types.
//!
//! The language model answers the extraction prompt with a single JSON object
//! `{block_updates, facts, triplets, summary}`. These types are both the wire
//! contract for that response and the value returned to the caller once the
//! result has been written to the stores.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Structured output of one extraction run.
///
/// Absent keys and JSON `null` are read as empty; any other shape mismatch
/// is a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub block_updates: Vec<BlockUpdate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facts: Vec<Fact>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub triplets: Vec<Triplet>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

impl ExtractionResult {
    /// True when the result carries nothing to store.
    pub fn is_empty(&self) -> bool {
        self.block_updates.is_empty()
            && self.facts.is_empty()
            && self.triplets.is_empty()
            && self.summary.is_empty()
    }
}

/// Full replacement content for one working-memory block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockUpdate {
    pub label: String,
    pub content: String,
}

/// A self-contained fact destined for archival memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// A subject-predicate-object edge for the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stages of an extraction run. `Failed` can follow any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Idle,
    BackendSelected,
    BackendInvoked,
    ResultParsed,
    StoresUpdated,
    Done,
    Failed,
}

impl IngestStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestStage::Done | IngestStage::Failed)
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStage::Idle => write!(f, "idle"),
            IngestStage::BackendSelected => write!(f, "backend_selected"),
            IngestStage::BackendInvoked => write!(f, "backend_invoked"),
            IngestStage::ResultParsed => write!(f, "result_parsed"),
            IngestStage::StoresUpdated => write!(f, "stores_updated"),
            IngestStage::Done => write!(f, "done"),
            IngestStage::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_result() {
        let json = r#"{
            "block_updates": [{"label": "human", "content": "X"}],
            "facts": [{"content": "Y", "tags": ["t"]}],
            "triplets": [{"subject": "A", "predicate": "p", "object": "B"}],
            "summary": "S"
        }"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.block_updates[0].label, "human");
        assert_eq!(result.facts[0].tags, vec!["t".to_string()]);
        assert_eq!(result.triplets[0].object, "B");
        assert_eq!(result.summary, "S");
        assert!(!result.is_empty());
    }

    #[test]
    fn test_missing_and_null_keys_read_as_empty() {
        let json = r#"{"facts": null, "triplets": [], "summary": null}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_fact_without_tags() {
        let json = r#"{"facts": [{"content": "untagged"}]}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        assert!(result.facts[0].tags.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let json = r#"{"facts": "not a list"}"#;
        assert!(serde_json::from_str::<ExtractionResult>(json).is_err());

        let json = r#"{"triplets": [{"subject": "A", "object": "B"}]}"#;
        assert!(serde_json::from_str::<ExtractionResult>(json).is_err());
    }

    #[test]
    fn test_serialize_uses_wire_keys() {
        let value = serde_json::to_value(ExtractionResult::default()).unwrap();
        for key in ["block_updates", "facts", "triplets", "summary"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_stage_terminal() {
        assert!(IngestStage::Done.is_terminal());
        assert!(IngestStage::Failed.is_terminal());
        assert!(!IngestStage::BackendInvoked.is_terminal());
        assert_eq!(IngestStage::StoresUpdated.to_string(), "stores_updated");
    }
}
