//! Server-side signature verification
//!
//! Verification sits on a trust boundary, so it only ever answers yes or no.
//! The reason for a rejection goes to `debug` logs, never to the caller.

use std::sync::Arc;

use chrono::Duration;
use chrono_tz::Tz;
use sigil_common::time::{parse_wall_clock, Clock, SystemClock};
use sigil_domain::constants::{DEFAULT_TIME_DRIFT_SECS, SIGN_KEY, TIMESTAMP_KEY};
use sigil_domain::{ClientConfig, RequestParams, Result};
use tracing::debug;

use super::canonical::compute_signature;

/// Stateless verifier; the secret is supplied per call.
#[derive(Debug, Clone)]
pub struct Verifier {
    time_drift: Duration,
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(DEFAULT_TIME_DRIFT_SECS), Tz::UTC)
    }
}

impl Verifier {
    pub fn new(time_drift: std::time::Duration, tz: Tz) -> Self {
        Self::with_clock(time_drift, tz, Arc::new(SystemClock))
    }

    pub fn with_clock(time_drift: std::time::Duration, tz: Tz, clock: Arc<dyn Clock>) -> Self {
        let time_drift = Duration::from_std(time_drift).unwrap_or(Duration::MAX);
        Self { time_drift, tz, clock }
    }

    /// Verifier matching a client's drift and timezone settings.
    ///
    /// # Errors
    /// Fails if the configured timezone is unknown.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(config.time_drift(), config.tz()?))
    }

    /// Check a signed envelope against `secret`.
    ///
    /// False when `_timestamp` or `_sign` is missing, when the timestamp is
    /// more than the drift window away from now (the window bound itself is
    /// accepted), or when the recomputed signature differs. `params` is
    /// never modified.
    pub fn verify(&self, params: &RequestParams, secret: &str) -> bool {
        let (Some(timestamp), Some(supplied)) =
            (params.get_string(TIMESTAMP_KEY), params.get_string(SIGN_KEY))
        else {
            debug!("signature rejected: reserved keys missing");
            return false;
        };

        let Some(signed_at) = parse_wall_clock(&timestamp, self.tz) else {
            debug!(timestamp = %timestamp, "signature rejected: unparseable timestamp");
            return false;
        };

        let skew = self.clock.now().signed_duration_since(signed_at);
        if skew > self.time_drift || skew < -self.time_drift {
            debug!(skew_secs = skew.num_seconds(), "signature rejected: timestamp outside window");
            return false;
        }

        let expected = compute_signature(params, secret);
        if expected != supplied {
            debug!("signature rejected: mismatch");
            return false;
        }
        true
    }
}

/// Verify with the default 300s window, UTC timestamps and the system clock.
pub fn verify(params: &RequestParams, secret: &str) -> bool {
    Verifier::default().verify(params, secret)
}
