//! Extraction instruction and response parsing.

use botmem_types::error::IngestError;
use botmem_types::extraction::ExtractionResult;

/// System instruction sent to every extraction backend.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a memory extraction system. Given conversation text, extract:

1. block_updates: Updates to core memory blocks. Labels are: "human" (personal info about the user), "persona" (bot personality), "context" (current project/session context). Only include blocks that need updating. Provide the FULL updated content for each block, not just the diff.

2. facts: Important facts worth remembering long-term. Each fact should be a self-contained statement with relevant tags.

3. triplets: Entity-relationship triplets (subject, predicate, object) for the knowledge graph. Examples: ("Stuart", "works_on", "Moltbot"), ("Moltbot", "is_a", "Discord bot").

4. summary: A concise summary of this conversation.

Return ONLY valid JSON matching this schema:
{
  "block_updates": [{"label": "string", "content": "string"}],
  "facts": [{"content": "string", "tags": ["string"]}],
  "triplets": [{"subject": "string", "predicate": "string", "object": "string"}],
  "summary": "string"
}"#;

/// Remove a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(s: &str) -> &str {
    let mut s = s.trim();
    if s.starts_with("```") {
        if let Some(idx) = s.find('\n') {
            s = &s[idx + 1..];
        }
    }
    if let Some(stripped) = s.strip_suffix("```") {
        s = stripped;
    }
    s.trim()
}

/// Parse backend output strictly as an [`ExtractionResult`].
///
/// The error carries the raw text so the caller can see what the model said.
pub fn parse_extraction(raw: &str) -> Result<ExtractionResult, IngestError> {
    let body = strip_code_fences(raw);
    serde_json::from_str(body).map_err(|e| IngestError::Schema {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("{}\n```"), "{}");
    }

    #[test]
    fn test_parse_fenced_result() {
        let raw = "```json\n{\"summary\": \"hi\", \"facts\": []}\n```";
        let result = parse_extraction(raw).unwrap();
        assert_eq!(result.summary, "hi");
    }

    #[test]
    fn test_parse_prose_is_schema_error_with_raw() {
        let err = parse_extraction("Sorry, I can't help with that.").unwrap_err();
        match err {
            IngestError::Schema { raw, .. } => assert_eq!(raw, "Sorry, I can't help with that."),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_wrong_shape_is_not_coerced() {
        assert!(parse_extraction(r#"{"block_updates": {"label": "human"}}"#).is_err());
        assert!(parse_extraction(r#"[1, 2, 3]"#).is_err());
    }

    #[test]
    fn test_prompt_lists_wire_keys() {
        for key in ["block_updates", "facts", "triplets", "summary"] {
            assert!(EXTRACTION_SYSTEM_PROMPT.contains(key));
        }
    }
}
