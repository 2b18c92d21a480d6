//! Context assembly: merge the memory stores into one prompt payload.

pub mod assembler;

pub use assembler::ContextAssembler;
