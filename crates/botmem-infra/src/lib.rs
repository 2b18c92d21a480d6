//! Infrastructure layer for botmem.
//!
//! Implements the store traits from `botmem-core` on SQLite, provides the
//! three extraction backends and the Ollama embedder, and owns configuration
//! and data-directory resolution.

pub mod config;
pub mod embedding;
pub mod filesystem;
pub mod ingest;
pub mod llm;
pub mod secret;
pub mod sqlite;
