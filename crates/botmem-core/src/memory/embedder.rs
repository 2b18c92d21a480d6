//! Embedder trait for text-to-vector conversion.
//!
//! Implementations (e.g., the Ollama `/api/embed` client) live in botmem-infra.

use botmem_types::llm::LlmError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Embedder: Send + Sync {
    /// Embed one or more texts. Returns one vector per input text.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send;

    /// The model name used for embeddings (e.g., "nomic-embed-text").
    fn model_name(&self) -> &str;

    /// The expected length of every output vector.
    fn dimension(&self) -> usize;
}
