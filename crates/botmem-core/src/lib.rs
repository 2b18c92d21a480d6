//! Business logic and repository trait definitions for botmem.
//!
//! This crate defines the "ports" (store traits, LLM backend and embedder
//! capabilities) that the infrastructure layer implements, plus the two
//! stages built on top of them: context assembly and extraction. It depends
//! only on `botmem-types` -- never on `botmem-infra` or any database/IO crate.

pub mod context;
pub mod ingest;
pub mod llm;
pub mod memory;
