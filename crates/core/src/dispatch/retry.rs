//! Retry policy and the public call contract

use std::sync::Arc;

use serde_json::Value;
use sigil_common::resilience::BackoffStrategy;
use sigil_common::time::{Clock, SystemClock};
use sigil_domain::{ClientConfig, Headers, RequestParams, Result, SigilError, Verb};
use tracing::{debug, info, instrument, warn};

use super::context::CallContext;
use super::ports::{DiagnosticsSink, NoopDiagnosticsSink, Transport};
use super::service::Dispatcher;
use crate::signing::Signer;

/// Signed API client: verb check, bounded retry, dispatch.
///
/// Safe to share across tasks; all state is read-only after construction.
pub struct SignedClient {
    dispatcher: Dispatcher,
    max_retries: u32,
    backoff: BackoffStrategy,
}

impl SignedClient {
    /// Start building a client from a configuration.
    pub fn builder(config: ClientConfig) -> SignedClientBuilder {
        SignedClientBuilder::new(config)
    }

    pub fn new(dispatcher: Dispatcher, max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self { dispatcher, max_retries: max_retries.max(1), backoff }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Call by verb name. Unknown verbs are rejected before anything is
    /// signed or sent.
    ///
    /// # Errors
    /// `SigilError::UnsupportedVerb`, plus everything [`Self::call_verb`]
    /// returns.
    pub async fn call(
        &self,
        verb: &str,
        path: &str,
        params: &mut RequestParams,
        headers: &Headers,
        ctx: &CallContext,
    ) -> Result<Value> {
        let verb: Verb = verb.parse()?;
        self.call_verb(verb, path, params, headers, ctx).await
    }

    /// Dispatch up to `max_retries` times, re-signing on every attempt.
    ///
    /// # Errors
    /// - the last `SigilError::Dispatch` once attempts are exhausted
    /// - `SigilError::Cancelled` / `SigilError::DeadlineExceeded` as soon as
    ///   `ctx` fires
    #[instrument(skip_all, fields(verb = %verb, path = %path, max_retries = self.max_retries))]
    pub async fn call_verb(
        &self,
        verb: Verb,
        path: &str,
        params: &mut RequestParams,
        headers: &Headers,
        ctx: &CallContext,
    ) -> Result<Value> {
        let mut attempt = 1;
        loop {
            ctx.check()?;
            match self.dispatcher.dispatch(path, params, headers, verb, ctx).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(attempt, "call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(SigilError::Dispatch(err)) if attempt < self.max_retries => {
                    warn!(attempt, error = %err, "dispatch failed, retrying");
                    let delay = self.backoff.delay_for(attempt);
                    if !delay.is_zero() {
                        debug!(delay_ms = delay.as_millis() as u64, "backing off");
                        ctx.run(tokio::time::sleep(delay)).await?;
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub async fn get(&self, path: &str, params: RequestParams) -> Result<Value> {
        self.simple(Verb::Get, path, params).await
    }

    pub async fn post(&self, path: &str, params: RequestParams) -> Result<Value> {
        self.simple(Verb::Post, path, params).await
    }

    pub async fn put(&self, path: &str, params: RequestParams) -> Result<Value> {
        self.simple(Verb::Put, path, params).await
    }

    pub async fn patch(&self, path: &str, params: RequestParams) -> Result<Value> {
        self.simple(Verb::Patch, path, params).await
    }

    pub async fn delete(&self, path: &str, params: RequestParams) -> Result<Value> {
        self.simple(Verb::Delete, path, params).await
    }

    async fn simple(&self, verb: Verb, path: &str, mut params: RequestParams) -> Result<Value> {
        self.call_verb(verb, path, &mut params, &Headers::new(), &CallContext::new()).await
    }
}

/// Builder for [`SignedClient`].
pub struct SignedClientBuilder {
    config: ClientConfig,
    primary: Option<Arc<dyn Transport>>,
    fallback: Option<Arc<dyn Transport>>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    clock: Arc<dyn Clock>,
}

impl SignedClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            primary: None,
            fallback: None,
            diagnostics: Arc::new(NoopDiagnosticsSink),
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn primary(mut self, transport: Arc<dyn Transport>) -> Self {
        self.primary = Some(transport);
        self
    }

    #[must_use]
    pub fn fallback(mut self, transport: Arc<dyn Transport>) -> Self {
        self.fallback = Some(transport);
        self
    }

    #[must_use]
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// # Errors
    /// `SigilError::Config` if the configuration is invalid or a transport
    /// is missing.
    pub fn build(self) -> Result<SignedClient> {
        self.config.validate()?;
        let primary = self
            .primary
            .ok_or_else(|| SigilError::Config("primary transport not set".into()))?;
        let fallback = self
            .fallback
            .ok_or_else(|| SigilError::Config("fallback transport not set".into()))?;

        let signer = Signer::from_config_with_clock(&self.config, self.clock)?;
        let dispatcher =
            Dispatcher::new(self.config.base_url.clone(), signer, primary, fallback, self.diagnostics)
                .with_fallback_on_error_status(self.config.fallback_on_error_status);

        Ok(SignedClient::new(dispatcher, self.config.max_retries, self.config.backoff))
    }
}
