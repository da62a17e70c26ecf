//! Tracing subscriber initialization
//!
//! `RUST_LOG` takes precedence over the configured default filter.

mod init_basic;

pub use init_basic::{init_telemetry, LogFormat, TelemetryConfig};
