//! OllamaEmbedder -- [`Embedder`] backed by Ollama's `/api/embed`.

use serde::{Deserialize, Serialize};

use botmem_core::memory::embedder::Embedder;
use botmem_types::llm::LlmError;

use crate::llm::error_for_status;

pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(base_url: String, model: String, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model,
            dimension,
        }
    }
}

impl Embedder for OllamaEmbedder {
    #[tracing::instrument(skip_all, fields(model = %self.model, count = texts.len()))]
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let url = format!("{}/api/embed", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("embedding request to {url} failed: {e}"),
            })?;

        let response = error_for_status(response).await?;

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse embed response: {e}")))?;

        if body.embeddings.len() != texts.len() {
            return Err(LlmError::Provider {
                message: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    body.embeddings.len()
                ),
            });
        }
        Ok(body.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let input = vec!["hello".to_string()];
        let value = serde_json::to_value(EmbedRequest {
            model: "nomic-embed-text",
            input: &input,
        })
        .unwrap();
        assert_eq!(value["model"], "nomic-embed-text");
        assert_eq!(value["input"][0], "hello");
    }

    #[test]
    fn test_parse_response() {
        let resp: EmbedResponse =
            serde_json::from_str(r#"{"model":"m","embeddings":[[0.1,0.2]]}"#).unwrap();
        assert_eq!(resp.embeddings, vec![vec![0.1, 0.2]]);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:1".to_string(), "m".to_string(), 2);
        assert!(embedder.embed(&["x".to_string()]).await.is_err());
    }
}
