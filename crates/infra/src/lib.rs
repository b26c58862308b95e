//! # Sigil Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - reqwest-backed primary and fallback transports
//! - An unsigned passthrough client for endpoints outside the signed API
//! - The hourly diagnostics file sink
//! - Configuration loading (environment, JSON, TOML)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `sigil-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use client::{build_client, client_from_env};
pub use diagnostics::FileDiagnosticsSink;
pub use errors::InfraError;
pub use http::{HttpTransport, HttpTransportBuilder, RawClient, RawClientBuilder};
pub use observability::{init_tracing, LogFormat};
