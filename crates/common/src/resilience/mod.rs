//! Resilience patterns for fault tolerance
//!
//! Currently limited to backoff strategies consumed by the retry policy in
//! `sigil-core`. The strategies are generic and carry no domain coupling.

pub mod backoff;

pub use backoff::{BackoffError, BackoffStrategy};
