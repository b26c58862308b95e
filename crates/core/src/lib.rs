//! # Sigil Core
//!
//! Signing and dispatch logic - no HTTP or filesystem code.
//!
//! This crate contains:
//! - The request signer and verifier
//! - Port interfaces for transports and the diagnostics sink
//! - The dispatcher (primary, then fallback) and the retrying client
//!
//! ## Architecture Principles
//! - Only depends on `sigil-common` and `sigil-domain`
//! - All I/O goes through the ports in [`dispatch::ports`]
//! - Pure, testable logic

pub mod dispatch;
pub mod signing;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use dispatch::{
    CallContext, DiagnosticsSink, Dispatcher, NoopDiagnosticsSink, OutboundRequest, SignedClient,
    SignedClientBuilder, Transport, TransportError, TransportResponse,
};
pub use signing::{verify, Signer, Verifier};
