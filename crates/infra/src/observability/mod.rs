//! Structured logging
//!
//! Library code only emits `tracing` events; binaries and tests opt in to
//! output by calling [`init_tracing`] once.

pub mod logging;

pub use logging::{env_filter, init_tracing, LogFormat, DEFAULT_FILTER};
