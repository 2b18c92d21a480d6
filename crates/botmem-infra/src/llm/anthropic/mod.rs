//! Anthropic Messages API backend.
//!
//! [`AnthropicProvider`] implements
//! [`LlmProvider`](botmem_core::llm::provider::LlmProvider) for `/v1/messages`.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
