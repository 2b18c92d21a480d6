//! OllamaProvider -- [`LlmProvider`] for a local Ollama `/api/chat` endpoint.

use serde::{Deserialize, Serialize};

use botmem_core::llm::provider::LlmProvider;
use botmem_types::llm::{CompletionRequest, CompletionResponse, LlmError, MessageRole, Usage};

use super::error_for_status;

/// Local Ollama chat backend. No credentials.
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    stream: bool,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

impl OllamaProvider {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model,
        }
    }

    fn to_chat_request(&self, request: &CompletionRequest) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(OllamaMessage {
                role: MessageRole::System.to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| OllamaMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));

        OllamaChatRequest {
            model: if request.model.is_empty() {
                self.model.clone()
            } else {
                request.model.clone()
            },
            stream: false,
            messages,
            format: request.json_output.then_some("json"),
            options: Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            }),
        }
    }
}

impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(
        name = "chat",
        skip_all,
        fields(gen_ai.provider.name = "ollama", gen_ai.request.model = %self.model)
    )]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let body = self.to_chat_request(request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("ollama request to {url} failed: {e}"),
            })?;

        let response = error_for_status(response).await?;

        let chat: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse ollama response: {e}")))?;

        if chat.message.content.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(CompletionResponse {
            content: chat.message.content,
            model: chat.model,
            usage: Usage {
                input_tokens: chat.prompt_eval_count,
                output_tokens: chat.eval_count,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botmem_types::llm::Message;

    fn request(json_output: bool) -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![Message::user("I'm Stuart")],
            system: Some("extract".to_string()),
            max_tokens: 4096,
            temperature: Some(0.0),
            json_output,
        }
    }

    #[test]
    fn test_chat_request_shape() {
        let provider = OllamaProvider::new("http://localhost:11434".to_string(), "llama3.2".to_string());
        let value = serde_json::to_value(provider.to_chat_request(&request(true))).unwrap();

        assert_eq!(value["model"], "llama3.2");
        assert_eq!(value["stream"], false);
        assert_eq!(value["format"], "json");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "extract");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["options"]["num_predict"], 4096);
    }

    #[test]
    fn test_format_omitted_without_json_output() {
        let provider = OllamaProvider::new("http://localhost:11434".to_string(), "llama3.2".to_string());
        let value = serde_json::to_value(provider.to_chat_request(&request(false))).unwrap();
        assert!(value.get("format").is_none());
    }

    #[test]
    fn test_parse_chat_response() {
        let json = r#"{"model":"llama3.2","message":{"role":"assistant","content":"{}"},"done":true,"eval_count":3}"#;
        let resp: OllamaChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.message.content, "{}");
        assert_eq!(resp.eval_count, 3);
        assert_eq!(resp.prompt_eval_count, 0);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_provider_error() {
        let provider = OllamaProvider::new("http://127.0.0.1:1".to_string(), "llama3.2".to_string());
        let err = provider.complete(&request(true)).await.unwrap_err();
        assert!(err.to_string().contains("127.0.0.1:1"));
    }
}
