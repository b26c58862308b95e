//! Dispatcher: sign → primary → fallback → classify

use std::sync::Arc;

use serde_json::Value;
use sigil_domain::constants::JSON_CONTENT_TYPE;
use sigil_domain::{
    DispatchError, ErrorRecord, Headers, RequestParams, Result, TransportKind, Verb,
};
use tracing::{debug, error, instrument, warn};

use super::context::CallContext;
use super::ports::{DiagnosticsSink, OutboundRequest, Transport, TransportResponse};
use crate::signing::Signer;

const CONTENT_TYPE: &str = "Content-Type";

/// Runs one signed request through the primary transport and, when that
/// yields nothing usable, through the fallback transport.
pub struct Dispatcher {
    base_url: String,
    signer: Signer,
    primary: Arc<dyn Transport>,
    fallback: Arc<dyn Transport>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    fallback_on_error_status: bool,
}

impl Dispatcher {
    pub fn new(
        base_url: impl Into<String>,
        signer: Signer,
        primary: Arc<dyn Transport>,
        fallback: Arc<dyn Transport>,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            signer,
            primary,
            fallback,
            diagnostics,
            fallback_on_error_status: false,
        }
    }

    /// Also treat non-2xx responses as empty.
    #[must_use]
    pub fn with_fallback_on_error_status(mut self, enabled: bool) -> Self {
        self.fallback_on_error_status = enabled;
        self
    }

    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Sign `params` in place and send them.
    ///
    /// Returns the first non-empty decoded body. Transport errors are not
    /// propagated; they only route the request to the fallback.
    ///
    /// # Errors
    /// - `SigilError::Dispatch` when both transports come back empty
    /// - `SigilError::Cancelled` / `SigilError::DeadlineExceeded` from `ctx`
    #[instrument(skip_all, fields(verb = %verb, path = %path))]
    pub async fn dispatch(
        &self,
        path: &str,
        params: &mut RequestParams,
        headers: &Headers,
        verb: Verb,
        ctx: &CallContext,
    ) -> Result<Value> {
        let url = self.url_for(path);
        self.signer.sign(params);

        let mut request =
            OutboundRequest { verb, url, headers: headers.clone(), params: params.clone() };

        let primary_failure = match self.attempt(TransportKind::Primary, &request, ctx).await? {
            Ok(value) => return Ok(value),
            Err(reason) => {
                warn!(url = %request.url, reason = %reason, "primary transport failed, falling back");
                ErrorRecord::primary(reason)
            }
        };

        request.headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE));
        request.headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());

        let fallback_failure = match self.attempt(TransportKind::Fallback, &request, ctx).await? {
            Ok(value) => {
                debug!(url = %request.url, "fallback transport succeeded");
                return Ok(value);
            }
            Err(reason) => ErrorRecord::fallback(reason),
        };

        let failure =
            DispatchError::exhausted(verb, request.url, primary_failure, fallback_failure);
        let written = self.diagnostics.record(&diagnostics_line(&failure));
        let failure = failure.with_diagnostics_path(written);
        error!(error = %failure, "all transports failed");
        Err(failure.into())
    }

    /// One transport attempt. The inner `Err` is the reason the result was
    /// rejected; the outer one is cancellation.
    async fn attempt(
        &self,
        kind: TransportKind,
        request: &OutboundRequest,
        ctx: &CallContext,
    ) -> Result<std::result::Result<Value, String>> {
        ctx.check()?;
        let transport = match kind {
            TransportKind::Primary => &self.primary,
            TransportKind::Fallback => &self.fallback,
        };

        let outcome = ctx.run(transport.send(request)).await?;
        Ok(match outcome {
            Ok(response) => decode_response(&response, self.fallback_on_error_status),
            Err(err) => Err(err.message),
        })
    }
}

/// Join base URL and resource path with exactly one `/`.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_matches('/'))
}

/// Decode a response body, rejecting anything that counts as empty.
pub fn decode_response(
    response: &TransportResponse,
    reject_error_status: bool,
) -> std::result::Result<Value, String> {
    if reject_error_status && !response.is_success() {
        return Err(format!("HTTP status {}", response.status));
    }
    if response.body.trim().is_empty() {
        return Err(format!("empty response body (HTTP {})", response.status));
    }
    let value: Value = serde_json::from_str(&response.body)
        .map_err(|e| format!("response body is not JSON (HTTP {}): {e}", response.status))?;
    if is_empty_payload(&value) {
        return Err(format!("empty JSON payload (HTTP {})", response.status));
    }
    Ok(value)
}

/// `null`, `false`, `0`, `""`, `"0"`, `[]` and `{}` carry no result.
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Bool(true) => false,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn diagnostics_line(failure: &DispatchError) -> String {
    format!(
        "{} {} failed on all transports; {}; {}",
        failure.verb.method_name(),
        failure.url,
        failure.primary,
        failure.fallback
    )
}
