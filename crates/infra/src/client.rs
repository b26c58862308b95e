//! Wiring of the production client

use std::sync::Arc;

use sigil_core::SignedClient;
use sigil_domain::{ClientConfig, Result, TransportKind};
use tracing::info;

use crate::config;
use crate::diagnostics::FileDiagnosticsSink;
use crate::http::HttpTransport;

/// Build a [`SignedClient`] with reqwest transports and the hourly file sink.
///
/// # Errors
/// `SigilError::Config` for an invalid configuration, `SigilError::Transport`
/// if an HTTP client cannot be constructed.
pub fn build_client(config: ClientConfig) -> Result<SignedClient> {
    let primary = HttpTransport::from_config(TransportKind::Primary, &config.primary)?;
    let fallback = HttpTransport::from_config(TransportKind::Fallback, &config.fallback)?;
    let diagnostics = FileDiagnosticsSink::from_config(&config);

    info!(
        base_url = %config.base_url,
        max_retries = config.max_retries,
        log_dir = %config.log_dir.display(),
        "building signed client"
    );

    SignedClient::builder(config)
        .primary(Arc::new(primary))
        .fallback(Arc::new(fallback))
        .diagnostics(Arc::new(diagnostics))
        .build()
}

/// [`config::load`] followed by [`build_client`].
///
/// # Errors
/// Everything either step returns.
pub fn client_from_env() -> Result<SignedClient> {
    build_client(config::load()?)
}
