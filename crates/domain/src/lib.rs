//! # Sigil Domain
//!
//! Data model for the signed API client.
//!
//! This crate contains:
//! - Configuration structures (`ClientConfig`, `TransportConfig`)
//! - Request parameters, headers and the supported verb set
//! - Error types and the `Result` alias
//! - Protocol constants (reserved envelope keys, defaults)
//!
//! ## Architecture
//! - Only depends on `sigil-common`
//! - No I/O, no HTTP

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::{ClientConfig, TransportConfig};
pub use errors::*;
pub use types::*;
