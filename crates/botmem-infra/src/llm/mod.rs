//! Extraction backend implementations.
//!
//! Three concrete [`LlmProvider`](botmem_core::llm::provider::LlmProvider)s
//! (the `claude -p` subprocess, the Anthropic Messages API and Ollama chat)
//! plus [`create_provider`], which picks one from an explicit [`LlmConfig`].

pub mod anthropic;
pub mod claude_cli;
pub mod ollama;

use secrecy::SecretString;

use botmem_core::llm::box_provider::BoxLlmProvider;
use botmem_types::config::LlmConfig;
use botmem_types::error::IngestError;
use botmem_types::llm::{LlmError, ProviderType};

use self::anthropic::AnthropicProvider;
use self::claude_cli::ClaudeCliProvider;
use self::ollama::OllamaProvider;

/// Build the configured backend.
///
/// `api_key` is the already-resolved Anthropic key (see
/// [`crate::secret::resolve_api_key`]); it is ignored by the other backends.
///
/// # Errors
///
/// `IngestError::Configuration` when the Anthropic backend is selected and no
/// key is available.
pub fn create_provider(
    config: &LlmConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, IngestError> {
    let model = config.resolved_model().to_string();
    let provider = match config.provider {
        ProviderType::Claude => BoxLlmProvider::new(ClaudeCliProvider::new(model)),
        ProviderType::Anthropic => {
            let key = api_key.ok_or_else(|| {
                IngestError::Configuration(
                    "no Anthropic API key -- set ANTHROPIC_API_KEY or run 'botmem init'".to_string(),
                )
            })?;
            BoxLlmProvider::new(AnthropicProvider::new(key, model))
        }
        ProviderType::Ollama => BoxLlmProvider::new(OllamaProvider::new(
            config.resolved_base_url().to_string(),
            model,
        )),
    };

    tracing::debug!(backend = provider.name(), model = provider.model(), "backend selected");
    Ok(provider)
}

/// Map a non-success HTTP response to an [`LlmError`] carrying the vendor body.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_ms = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(|secs| secs * 1000);
    let body = response.text().await.unwrap_or_default();

    Err(match status.as_u16() {
        401 => LlmError::AuthenticationFailed { body },
        429 => LlmError::RateLimited {
            retry_after_ms,
            body,
        },
        529 => LlmError::Overloaded(body),
        code => LlmError::Status { status: code, body },
    })
}
