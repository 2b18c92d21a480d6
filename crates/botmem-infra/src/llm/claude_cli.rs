//! ClaudeCliProvider -- [`LlmProvider`] that shells out to `claude -p`.
//!
//! Uses the locally authenticated Claude Code CLI, so no API key is needed.
//! The system instruction and the user text travel as a single prompt argument.

use botmem_core::llm::provider::LlmProvider;
use botmem_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

const DEFAULT_PROGRAM: &str = "claude";

/// Separator between the instruction and the text to extract from.
const TEXT_HEADER: &str = "\n\nConversation text to extract from:\n\n";

pub struct ClaudeCliProvider {
    program: String,
    model: String,
}

impl ClaudeCliProvider {
    pub fn new(model: String) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            model,
        }
    }

    /// Run a different executable with the same arguments.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn build_prompt(request: &CompletionRequest) -> String {
        let text = request.user_text();
        match &request.system {
            Some(system) => format!("{system}{TEXT_HEADER}{text}"),
            None => text,
        }
    }
}

impl LlmProvider for ClaudeCliProvider {
    fn name(&self) -> &str {
        "claude"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(
        name = "chat",
        skip_all,
        fields(gen_ai.provider.name = "claude", program = %self.program)
    )]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let prompt = Self::build_prompt(request);
        let command = format!("{} -p --output-format text", self.program);

        let output = tokio::process::Command::new(&self.program)
            .args(["-p", "--output-format", "text"])
            .arg(&prompt)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| LlmError::Subprocess {
                command: command.clone(),
                status: "failed to start".to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(LlmError::Subprocess {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(CompletionResponse {
            content: stdout,
            model: self.model.clone(),
            usage: Usage::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botmem_types::llm::Message;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![Message::user("I'm Stuart")],
            system: Some("SYSTEM".to_string()),
            max_tokens: 4096,
            temperature: None,
            json_output: true,
        }
    }

    #[test]
    fn test_prompt_joins_system_and_text() {
        assert_eq!(
            ClaudeCliProvider::build_prompt(&request()),
            "SYSTEM\n\nConversation text to extract from:\n\nI'm Stuart"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_becomes_content() {
        let provider = ClaudeCliProvider::new("claude".to_string()).with_program("echo");
        let response = provider.complete(&request()).await.unwrap();
        assert!(response.content.starts_with("-p --output-format text SYSTEM"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_subprocess_error() {
        let provider = ClaudeCliProvider::new("claude".to_string()).with_program("false");
        let err = provider.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Subprocess { .. }), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_stdout_is_error() {
        let provider = ClaudeCliProvider::new("claude".to_string()).with_program("true");
        let err = provider.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_missing_program_is_subprocess_error() {
        let provider =
            ClaudeCliProvider::new("claude".to_string()).with_program("botmem-no-such-binary");
        let err = provider.complete(&request()).await.unwrap_err();
        match err {
            LlmError::Subprocess { status, .. } => assert_eq!(status, "failed to start"),
            other => panic!("expected Subprocess error, got {other:?}"),
        }
    }
}
