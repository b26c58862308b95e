use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder};
use sigil_core::{OutboundRequest, Transport, TransportError, TransportResponse};
use sigil_domain::{SigilError, TransportConfig, TransportKind, Verb};
use tracing::debug;

use crate::errors::{transport_error, InfraError};

/// reqwest-backed [`Transport`]. One instance per role (primary or
/// fallback); the timeout and TLS policy are fixed at build time.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    kind: TransportKind,
    debug_capture: bool,
}

impl HttpTransport {
    /// Start building a new transport.
    pub fn builder(kind: TransportKind) -> HttpTransportBuilder {
        HttpTransportBuilder::new(kind)
    }

    /// Transport configured from one [`TransportConfig`] block.
    pub fn from_config(kind: TransportKind, config: &TransportConfig) -> Result<Self, SigilError> {
        Self::builder(kind)
            .timeout(config.timeout())
            .verify_tls(config.verify_tls)
            .debug_capture(config.debug_capture)
            .build()
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    fn prepare(&self, request: &OutboundRequest) -> RequestBuilder {
        let mut builder = self.client.request(method_for(request.verb), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if request.verb.uses_query_string() {
            builder.query(&request.params.to_query_pairs())
        } else {
            builder.json(&request.params)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
        let method = request.verb.method_name();
        if self.debug_capture {
            debug!(
                transport = %self.kind,
                %method,
                url = %request.url,
                headers = ?request.headers,
                params = %request.params.to_json(),
                "sending HTTP request"
            );
        }

        let response = self.prepare(request).send().await.map_err(|err| {
            debug!(transport = %self.kind, %method, url = %request.url, error = %err, "HTTP request failed");
            transport_error(&err)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| transport_error(&err))?;

        if self.debug_capture {
            debug!(
                transport = %self.kind,
                %method,
                url = %request.url,
                status,
                body_bytes = body.len(),
                body = %body,
                "received HTTP response"
            );
        }

        Ok(TransportResponse::new(status, body))
    }
}

pub(crate) fn method_for(verb: Verb) -> Method {
    match verb {
        Verb::Get => Method::GET,
        Verb::Post => Method::POST,
        Verb::Put => Method::PUT,
        Verb::Patch => Method::PATCH,
        Verb::Delete => Method::DELETE,
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    kind: TransportKind,
    timeout: Duration,
    verify_tls: bool,
    debug_capture: bool,
}

impl HttpTransportBuilder {
    fn new(kind: TransportKind) -> Self {
        let defaults = match kind {
            TransportKind::Primary => TransportConfig::primary(),
            TransportKind::Fallback => TransportConfig::fallback(),
        };
        Self {
            kind,
            timeout: defaults.timeout(),
            verify_tls: defaults.verify_tls,
            debug_capture: defaults.debug_capture,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// When `false`, self-signed and otherwise invalid certificates are
    /// accepted.
    pub fn verify_tls(mut self, enabled: bool) -> Self {
        self.verify_tls = enabled;
        self
    }

    pub fn debug_capture(mut self, enabled: bool) -> Self {
        self.debug_capture = enabled;
        self
    }

    pub fn build(self) -> Result<HttpTransport, SigilError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if !self.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|err| SigilError::from(InfraError::from(err)))?;

        Ok(HttpTransport { client, kind: self.kind, debug_capture: self.debug_capture })
    }
}
