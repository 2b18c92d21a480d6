//! Observability setup for botmem: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
