pub mod conversions;

pub use conversions::{describe_http_error, transport_error, InfraError};
