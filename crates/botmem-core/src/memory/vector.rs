//! Embedding serialization and brute-force similarity scoring.
//!
//! Vectors are persisted as little-endian `f32` bytes, four per component.

use botmem_types::memory::ArchivalEntry;

pub fn serialize_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode a stored embedding. Returns `None` if the length is not a multiple of 4.
pub fn deserialize_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

/// Cosine similarity in `[-1, 1]`. Mismatched lengths or a zero vector score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

/// Score every entry that carries a decodable embedding against `query`,
/// highest first, keeping at most `limit`.
pub fn rank_by_similarity(
    query: &[f32],
    entries: Vec<ArchivalEntry>,
    limit: usize,
) -> Vec<(ArchivalEntry, f32)> {
    let mut scored: Vec<(ArchivalEntry, f32)> = entries
        .into_iter()
        .filter_map(|entry| {
            let vector = deserialize_embedding(entry.embedding.as_deref()?)?;
            if vector.len() != query.len() {
                return None;
            }
            let score = cosine_similarity(query, &vector);
            Some((entry, score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: i64, vector: Option<&[f32]>) -> ArchivalEntry {
        ArchivalEntry {
            id,
            content: format!("fact {id}"),
            tags: String::new(),
            embedding: vector.map(serialize_embedding),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_serialized_length_is_four_bytes_per_component() {
        let bytes = serialize_embedding(&[1.0, -2.5, 0.0]);
        assert_eq!(bytes.len(), 12);
        assert_eq!(deserialize_embedding(&bytes).unwrap(), vec![1.0, -2.5, 0.0]);
        assert!(deserialize_embedding(&bytes[..5]).is_none());
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_by_score_and_skips_unembedded() {
        let entries = vec![
            entry(1, Some(&[0.0, 1.0])),
            entry(2, None),
            entry(3, Some(&[1.0, 0.1])),
            entry(4, Some(&[1.0, 0.0, 0.0])),
        ];
        let ranked = rank_by_similarity(&[1.0, 0.0], entries, 10);
        let ids: Vec<i64> = ranked.iter().map(|(e, _)| e.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_rank_truncates() {
        let entries = (1..=5).map(|i| entry(i, Some(&[1.0, i as f32]))).collect();
        assert_eq!(rank_by_similarity(&[1.0, 1.0], entries, 2).len(), 2);
    }
}
