//! Common utilities shared across Sigil crates.
//!
//! - [`time`]: clock abstraction and wall-clock timestamp helpers
//! - [`resilience`]: backoff strategies for retry loops
//!
//! Nothing in this crate knows about signing or HTTP.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;
pub mod time;
