//! BoxEmbedder -- object-safe dynamic dispatch wrapper for Embedder.
//!
//! Same blanket-impl shape as `BoxLlmProvider`: an object-safe `EmbedderDyn`
//! with boxed futures, implemented for every `T: Embedder`.

use std::future::Future;
use std::pin::Pin;

use botmem_types::llm::LlmError;

use super::embedder::Embedder;

/// Object-safe version of [`Embedder`] with boxed futures.
pub trait EmbedderDyn: Send + Sync {
    fn embed_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send + 'a>>;

    fn model_name_dyn(&self) -> &str;

    fn dimension_dyn(&self) -> usize;
}

impl<T: Embedder> EmbedderDyn for T {
    fn embed_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send + 'a>> {
        Box::pin(self.embed(texts))
    }

    fn model_name_dyn(&self) -> &str {
        self.model_name()
    }

    fn dimension_dyn(&self) -> usize {
        self.dimension()
    }
}

/// Type-erased embedder, selected at runtime from configuration.
pub struct BoxEmbedder {
    inner: Box<dyn EmbedderDyn + Send + Sync>,
}

impl BoxEmbedder {
    pub fn new<T: Embedder + 'static>(embedder: T) -> Self {
        Self {
            inner: Box::new(embedder),
        }
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.inner.embed_boxed(texts).await
    }

    /// Embed a single text and check its length against [`Self::dimension`].
    ///
    /// A vector of the wrong length is reported as a provider error so the
    /// caller can treat it like any other embedding failure.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let texts = [text.to_string()];
        let vector = self
            .embed(&texts)
            .await?
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        let expected = self.dimension();
        if vector.len() != expected {
            return Err(LlmError::Provider {
                message: format!(
                    "embedding dimension mismatch: expected {expected}, got {}",
                    vector.len()
                ),
            });
        }
        Ok(vector)
    }

    pub fn model_name(&self) -> &str {
        self.inner.model_name_dyn()
    }

    pub fn dimension(&self) -> usize {
        self.inner.dimension_dyn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder {
        len: usize,
    }

    impl Embedder for FixedEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
            Ok(texts.iter().map(|_| vec![0.5; self.len]).collect())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    #[tokio::test]
    async fn test_embed_one_returns_vector() {
        let embedder = BoxEmbedder::new(FixedEmbedder { len: 4 });
        let v = embedder.embed_one("hello").await.unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(embedder.model_name(), "fixed");
    }

    #[tokio::test]
    async fn test_embed_one_rejects_wrong_dimension() {
        let embedder = BoxEmbedder::new(FixedEmbedder { len: 3 });
        let err = embedder.embed_one("hello").await.unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }
}
