//! Embedding providers.

pub mod ollama;

use botmem_core::memory::box_embedder::BoxEmbedder;
use botmem_types::config::EmbeddingsConfig;

use self::ollama::OllamaEmbedder;

/// Build the configured embedder, or `None` when embeddings are disabled.
pub fn create_embedder(config: &EmbeddingsConfig) -> Option<BoxEmbedder> {
    if !config.enabled {
        return None;
    }
    Some(BoxEmbedder::new(OllamaEmbedder::new(
        config.base_url.clone(),
        config.model.clone(),
        config.dimension,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_yields_none() {
        assert!(create_embedder(&EmbeddingsConfig::default()).is_none());
    }

    #[test]
    fn test_enabled_yields_ollama() {
        let config = EmbeddingsConfig {
            enabled: true,
            ..Default::default()
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.dimension(), 768);
    }
}
