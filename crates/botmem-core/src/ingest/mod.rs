//! Extraction pipeline: free text in, typed writes across the four stores out.

pub mod pipeline;
pub mod prompt;

pub use pipeline::IngestPipeline;
