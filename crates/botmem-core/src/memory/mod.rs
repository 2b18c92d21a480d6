//! Memory persistence contracts for botmem.
//!
//! This module defines the store traits the infrastructure layer implements
//! for the four memory representations, the `Embedder` trait used to attach
//! vectors to archival facts, and the vector helpers that score them.

pub mod box_embedder;
pub mod embedder;
pub mod store;
pub mod vector;
