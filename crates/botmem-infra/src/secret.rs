//! Anthropic API key resolution.
//!
//! The key comes from `config.toml` first, then the `ANTHROPIC_API_KEY`
//! environment variable. Resolution happens here, before the extraction
//! pipeline is built, so the pipeline never reads the environment.

use secrecy::SecretString;

use botmem_types::config::LlmConfig;

pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Resolve the API key from config, falling back to the process environment.
pub fn resolve_api_key(config: &LlmConfig) -> Option<SecretString> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

/// Same as [`resolve_api_key`] with an injectable environment lookup.
pub fn resolve_api_key_with(
    config: &LlmConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| env(ANTHROPIC_API_KEY_ENV).filter(|k| !k.trim().is_empty()))
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_config_key_wins() {
        let config = LlmConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        let key = resolve_api_key_with(&config, |_| Some("from-env".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "from-config");
    }

    #[test]
    fn test_env_fallback() {
        let config = LlmConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        let key = resolve_api_key_with(&config, |name| {
            (name == ANTHROPIC_API_KEY_ENV).then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "from-env");
    }

    #[test]
    fn test_no_key_anywhere() {
        assert!(resolve_api_key_with(&LlmConfig::default(), |_| None).is_none());
        assert!(resolve_api_key_with(&LlmConfig::default(), |_| Some(String::new())).is_none());
    }
}
