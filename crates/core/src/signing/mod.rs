//! Shared-secret request signing
//!
//! ```text
//! params ──► drop _sign ──► + app key ──► + _timestamp ──► sort
//!        ──► secret + k1v1k2v2… + secret ──► MD5 ──► upper hex ──► _sign
//! ```
//!
//! [`Signer`] runs on the client; [`Verifier`] recomputes the same string on
//! the receiving side.

pub mod canonical;
pub mod signer;
pub mod verifier;

pub use canonical::{compute_signature, digest, signing_string};
pub use signer::Signer;
pub use verifier::{verify, Verifier};
