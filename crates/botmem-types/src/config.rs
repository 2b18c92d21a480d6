//! Configuration types for botmem.
//!
//! `AppConfig` represents `config.toml` in the data directory. It selects the
//! extraction backend and the optional embedding provider, and is threaded
//! explicitly into the extraction pipeline's entry point.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

/// Top-level configuration. All fields have defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
}

/// Extraction backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderType,
    /// Empty means the backend's default model.
    #[serde(default)]
    pub model: String,
    /// Anthropic only. When absent, `ANTHROPIC_API_KEY` is consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Ollama only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_provider() -> ProviderType {
    ProviderType::Claude
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            api_key: None,
            base_url: None,
        }
    }
}

impl LlmConfig {
    /// The configured model, or the backend's default when unset.
    pub fn resolved_model(&self) -> &str {
        if !self.model.is_empty() {
            return &self.model;
        }
        match self.provider {
            ProviderType::Claude => "claude",
            ProviderType::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            ProviderType::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_OLLAMA_URL)
    }
}

/// Optional embedding provider settings (Ollama `/api/embed`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Expected vector length. Stored embeddings are `dimension * 4` bytes.
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_embedding_dimension() -> usize {
    DEFAULT_EMBEDDING_DIMENSION
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_embedding_model(),
            base_url: default_ollama_url(),
            dimension: default_embedding_dimension(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, ProviderType::Claude);
        assert!(!config.embeddings.enabled);
        assert_eq!(config.embeddings.dimension, 768);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
[llm]
provider = "ollama"
model = "llama3.2"
base_url = "http://gpu-box:11434"

[embeddings]
enabled = true
"#,
        )
        .unwrap();
        assert_eq!(config.llm.provider, ProviderType::Ollama);
        assert_eq!(config.llm.resolved_base_url(), "http://gpu-box:11434");
        assert!(config.embeddings.enabled);
        assert_eq!(config.embeddings.model, "nomic-embed-text");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = toml::from_str::<AppConfig>("[llm]\nprovider = \"bedrock\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolved_model_defaults_per_provider() {
        let mut llm = LlmConfig {
            provider: ProviderType::Anthropic,
            ..Default::default()
        };
        assert_eq!(llm.resolved_model(), DEFAULT_ANTHROPIC_MODEL);
        llm.provider = ProviderType::Ollama;
        assert_eq!(llm.resolved_model(), DEFAULT_OLLAMA_MODEL);
        llm.model = "qwen2.5".to_string();
        assert_eq!(llm.resolved_model(), "qwen2.5");
    }

    #[test]
    fn test_api_key_omitted_when_absent() {
        let rendered = toml::to_string(&AppConfig::default()).unwrap();
        assert!(!rendered.contains("api_key"));
        assert!(rendered.contains("provider = \"claude\""));
    }
}
