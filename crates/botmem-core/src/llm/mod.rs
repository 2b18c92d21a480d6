//! LLM provider abstractions for botmem.
//!
//! - `LlmProvider`: RPITIT trait for concrete backend implementations
//! - `BoxLlmProvider`: object-safe wrapper for runtime backend selection

pub mod box_provider;
pub mod provider;
