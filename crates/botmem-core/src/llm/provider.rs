//! LlmProvider trait definition.

use botmem_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for extraction backends (claude CLI, Anthropic API, Ollama).
///
/// Implementations live in botmem-infra.
pub trait LlmProvider: Send + Sync {
    /// Backend name (e.g., "claude", "anthropic", "ollama").
    fn name(&self) -> &str;

    /// The model this backend sends requests to.
    fn model(&self) -> &str;

    /// Send a completion request and receive the full response text.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
