//! Tracing/logging setup shared by the console binaries.
//!
//! Call [`tracing::init`] once at startup; later calls are no-ops.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::LogFormat;
