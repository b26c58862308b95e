//! Domain types: parameters, verbs, transport records

pub mod params;
pub mod transport;
pub mod verb;

use std::collections::BTreeMap;

pub use params::{coerce_to_string, RequestParams};
pub use transport::{ErrorRecord, TransportKind};
pub use verb::Verb;

/// Caller-supplied HTTP headers (name → value).
pub type Headers = BTreeMap<String, String>;
