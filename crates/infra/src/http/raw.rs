//! Unsigned passthrough requests
//!
//! For endpoints outside the signed API. Nothing is signed, retried or
//! recorded to the diagnostics file, and the response comes back whatever
//! its status.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use sigil_core::{TransportError, TransportResponse};
use sigil_domain::constants::{
    FORM_CONTENT_TYPE, RAW_CONNECT_TIMEOUT_SECS, RAW_TIMEOUT_SECS, RAW_USER_AGENT,
};
use sigil_domain::{Headers, SigilError, Verb};
use tracing::debug;

use super::transport::method_for;
use crate::errors::{transport_error, InfraError};

/// reqwest client for raw, unsigned calls.
///
/// Certificates are never verified. Timeouts are long (50s connect, 300s
/// total) because the targets are slow third-party services.
#[derive(Debug, Clone)]
pub struct RawClient {
    client: ReqwestClient,
}

impl RawClient {
    /// Client with the default timeouts and User-Agent.
    pub fn new() -> Result<Self, SigilError> {
        Self::builder().build()
    }

    pub fn builder() -> RawClientBuilder {
        RawClientBuilder::default()
    }

    /// Send `fields` (an already-encoded `a=1&b=2` string) to `url`.
    ///
    /// POST, PUT and PATCH carry `fields` as a form body; GET and DELETE
    /// append it to the query string.
    ///
    /// # Errors
    /// Connect, timeout and body-read failures, with the same messages as
    /// the signed transports.
    pub async fn request(
        &self,
        verb: Verb,
        url: &str,
        fields: Option<&str>,
        headers: &Headers,
    ) -> Result<TransportResponse, TransportError> {
        let method = verb.method_name();
        let response = self.prepare(verb, url, fields, headers).send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "raw request failed");
            transport_error(&err)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| transport_error(&err))?;
        debug!(%method, %url, status, body_bytes = body.len(), "raw response received");

        Ok(TransportResponse::new(status, body))
    }

    fn prepare(
        &self,
        verb: Verb,
        url: &str,
        fields: Option<&str>,
        headers: &Headers,
    ) -> RequestBuilder {
        let fields = fields.filter(|f| !f.is_empty());
        let target = match fields {
            Some(query) if !sends_form_body(verb) => append_query(url, query),
            _ => url.to_string(),
        };

        let mut builder = self.client.request(method_for(verb), target);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        match fields {
            Some(body) if sends_form_body(verb) => {
                if !headers.keys().any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())) {
                    builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
                }
                builder.body(body.to_string())
            }
            _ => builder,
        }
    }
}

fn sends_form_body(verb: Verb) -> bool {
    matches!(verb, Verb::Post | Verb::Put | Verb::Patch)
}

fn append_query(url: &str, query: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

/// Builder for [`RawClient`].
#[derive(Debug)]
pub struct RawClientBuilder {
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: String,
}

impl Default for RawClientBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(RAW_CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(RAW_TIMEOUT_SECS),
            user_agent: RAW_USER_AGENT.to_string(),
        }
    }
}

impl RawClientBuilder {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<RawClient, SigilError> {
        let client = ReqwestClient::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .danger_accept_invalid_certs(true)
            .no_proxy()
            .build()
            .map_err(|err| SigilError::from(InfraError::from(err)))?;

        Ok(RawClient { client })
    }
}
