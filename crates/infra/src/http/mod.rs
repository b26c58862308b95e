//! HTTP transports

pub mod raw;
pub mod transport;

pub use raw::{RawClient, RawClientBuilder};
pub use transport::{HttpTransport, HttpTransportBuilder};
