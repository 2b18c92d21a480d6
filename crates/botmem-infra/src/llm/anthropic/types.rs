//! Anthropic Messages API types.
//!
//! Vendor-specific wire structures. The provider-agnostic shapes live in
//! `botmem_types::llm`.

use serde::{Deserialize, Serialize};

/// Request body for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Non-streaming response from `/v1/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    pub model: String,
    pub content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    pub usage: AnthropicUsage,
}

/// A content block in an Anthropic response. Only text is used here.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}
