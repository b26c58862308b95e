//! Request dispatch: transports, fallback, retry

pub mod context;
pub mod ports;
pub mod retry;
pub mod service;

pub use context::CallContext;
pub use ports::{
    DiagnosticsSink, NoopDiagnosticsSink, OutboundRequest, Transport, TransportError,
    TransportResponse,
};
pub use retry::{SignedClient, SignedClientBuilder};
pub use service::{decode_response, is_empty_payload, join_url, Dispatcher};
