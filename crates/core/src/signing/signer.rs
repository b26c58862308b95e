//! Request signer

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sigil_common::time::{format_wall_clock, Clock, SystemClock};
use sigil_domain::constants::{SIGN_KEY, TIMESTAMP_KEY};
use sigil_domain::{ClientConfig, RequestParams, Result};

use super::canonical::compute_signature;

/// Turns caller parameters into a signed envelope, in place.
#[derive(Clone)]
pub struct Signer {
    app_key: String,
    app_key_field: String,
    app_secret: String,
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl Signer {
    pub fn new(
        app_key: impl Into<String>,
        app_key_field: impl Into<String>,
        app_secret: impl Into<String>,
        tz: Tz,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_key_field: app_key_field.into(),
            app_secret: app_secret.into(),
            tz,
            clock,
        }
    }

    /// Signer using the system clock.
    ///
    /// # Errors
    /// Fails if the configured timezone is unknown.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// # Errors
    /// Fails if the configured timezone is unknown.
    pub fn from_config_with_clock(config: &ClientConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self::new(
            config.app_key.clone(),
            config.app_key_field.clone(),
            config.app_secret.clone(),
            config.tz()?,
            clock,
        ))
    }

    /// Sign `params` at the clock's current time. Returns the signature.
    pub fn sign(&self, params: &mut RequestParams) -> String {
        self.sign_at(params, self.clock.now())
    }

    /// Sign `params` as of `now`.
    ///
    /// Drops any stale `_sign`, injects the app key and `_timestamp`, then
    /// computes `_sign` over everything else.
    pub fn sign_at(&self, params: &mut RequestParams, now: DateTime<Utc>) -> String {
        params.remove(SIGN_KEY);
        params.insert(self.app_key_field.clone(), self.app_key.clone());
        params.insert(TIMESTAMP_KEY, format_wall_clock(now, self.tz));

        let signature = compute_signature(params, &self.app_secret);
        params.insert(SIGN_KEY, signature.clone());
        signature
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("app_key", &self.app_key)
            .field("app_key_field", &self.app_key_field)
            .field("app_secret", &"<redacted>")
            .field("tz", &self.tz)
            .finish_non_exhaustive()
    }
}
