//! Shared domain types for botmem.
//!
//! This crate contains the domain types used across the workspace: the four
//! memory representations (blocks, archival entries, graph, summaries), the
//! extraction result produced by a language model, the context payload, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod memory;
