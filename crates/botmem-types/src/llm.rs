//! LLM request/response types for botmem.
//!
//! These types model the data shapes exchanged with a language-model backend:
//! a system instruction plus user text in, a block of text out. Backends are
//! interchangeable behind this shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request to an LLM provider for a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Empty means "use the provider's configured model".
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Ask the backend to constrain its output to a JSON object, where supported.
    #[serde(default)]
    pub json_output: bool,
}

impl CompletionRequest {
    /// Concatenated text of all user messages.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Response from an LLM provider for a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
}

/// Token usage for a completion, when the backend reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from LLM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("HTTP 429 rate limited{}: {body}", retry_hint(.retry_after_ms))]
    RateLimited {
        retry_after_ms: Option<u64>,
        body: String,
    },

    #[error("HTTP 529 provider overloaded: {0}")]
    Overloaded(String),

    #[error("HTTP 401 authentication failed: {body}")]
    AuthenticationFailed { body: String },

    #[error("subprocess '{command}' failed ({status}): {stderr}")]
    Subprocess {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("empty response from provider")]
    EmptyResponse,
}

fn retry_hint(retry_after_ms: &Option<u64>) -> String {
    match retry_after_ms {
        Some(ms) => format!(" (retry after {ms}ms)"),
        None => String::new(),
    }
}

/// Language-model backend selected in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Local `claude -p` subprocess. No API key needed.
    Claude,
    /// Hosted Anthropic Messages API.
    Anthropic,
    /// Local Ollama chat API.
    Ollama,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::Claude => write!(f, "claude"),
            ProviderType::Anthropic => write!(f, "anthropic"),
            ProviderType::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(ProviderType::Claude),
            "anthropic" => Ok(ProviderType::Anthropic),
            "ollama" => Ok(ProviderType::Ollama),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_roundtrip() {
        for p in [ProviderType::Claude, ProviderType::Anthropic, ProviderType::Ollama] {
            assert_eq!(p.to_string().parse::<ProviderType>().unwrap(), p);
        }
        assert!("bedrock".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_user_text_skips_other_roles() {
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![
                Message {
                    role: MessageRole::Assistant,
                    content: "ignored".to_string(),
                },
                Message::user("hello"),
            ],
            system: Some("sys".to_string()),
            max_tokens: 10,
            temperature: None,
            json_output: false,
        };
        assert_eq!(request.user_text(), "hello");
    }

    #[test]
    fn test_status_error_display_carries_body() {
        let err = LlmError::Status {
            status: 400,
            body: "{\"error\":\"bad model\"}".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 400: {\"error\":\"bad model\"}");
    }

    #[test]
    fn test_auth_and_rate_limit_errors_carry_body() {
        let err = LlmError::AuthenticationFailed {
            body: "invalid x-api-key".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401 authentication failed: invalid x-api-key");

        let err = LlmError::RateLimited {
            retry_after_ms: None,
            body: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 429 rate limited: slow down");

        let err = LlmError::RateLimited {
            retry_after_ms: Some(3000),
            body: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 429 rate limited (retry after 3000ms): slow down");
    }
}
