//! Ringside Infrastructure Library
//!
//! Shared infrastructure for Ringside binaries:
//! - Telemetry initialization (tracing subscriber)

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, LogFormat, TelemetryConfig};
