//! Client configuration structures
//!
//! `ClientConfig` is built once (directly or through the infra loader),
//! validated, and then shared read-only by every call of one client.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sigil_common::resilience::BackoffStrategy;

use crate::constants::{
    DEFAULT_APP_KEY_FIELD, DEFAULT_APP_NAME, DEFAULT_LOG_DIR, DEFAULT_MAX_RETRIES,
    DEFAULT_TIMEZONE, DEFAULT_TIME_DRIFT_SECS, FALLBACK_TIMEOUT_MS, PRIMARY_TIMEOUT_MS,
};
use crate::errors::{Result, SigilError};

/// Per-transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Verify the peer's TLS certificate. Off by default to match the
    /// internal services this client talks to.
    #[serde(default)]
    pub verify_tls: bool,
    /// Emit request/response detail as `debug` events.
    #[serde(default)]
    pub debug_capture: bool,
}

impl TransportConfig {
    pub fn primary() -> Self {
        Self { timeout_ms: PRIMARY_TIMEOUT_MS, verify_tls: false, debug_capture: false }
    }

    pub fn fallback() -> Self {
        Self { timeout_ms: FALLBACK_TIMEOUT_MS, verify_tls: false, debug_capture: false }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Complete configuration for one signed client.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub app_key: String,
    /// Parameter name the app key is sent under.
    #[serde(default = "default_app_key_field")]
    pub app_key_field: String,
    pub app_secret: String,
    /// Total dispatch attempts per call.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Accepted clock skew, in seconds, when verifying `_timestamp`.
    #[serde(default = "default_time_drift_secs")]
    pub time_drift_secs: u64,
    /// IANA timezone used to format and parse `_timestamp`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Identity used in diagnostics file names.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub backoff: BackoffStrategy,
    /// Treat non-2xx responses as empty (and fall back). Off by default:
    /// only the decoded body decides.
    #[serde(default)]
    pub fallback_on_error_status: bool,
    #[serde(default = "TransportConfig::primary")]
    pub primary: TransportConfig,
    #[serde(default = "TransportConfig::fallback")]
    pub fallback: TransportConfig,
}

fn default_app_key_field() -> String {
    DEFAULT_APP_KEY_FIELD.to_string()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_time_drift_secs() -> u64 {
    DEFAULT_TIME_DRIFT_SECS
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

impl ClientConfig {
    /// Configuration with every optional field at its default.
    pub fn new(
        base_url: impl Into<String>,
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_key: app_key.into(),
            app_key_field: default_app_key_field(),
            app_secret: app_secret.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            time_drift_secs: DEFAULT_TIME_DRIFT_SECS,
            timezone: default_timezone(),
            app_name: default_app_name(),
            log_dir: default_log_dir(),
            backoff: BackoffStrategy::None,
            fallback_on_error_status: false,
            primary: TransportConfig::primary(),
            fallback: TransportConfig::fallback(),
        }
    }

    #[must_use]
    pub fn with_app_key_field(mut self, field: impl Into<String>) -> Self {
        self.app_key_field = field.into();
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>, app_name: impl Into<String>) -> Self {
        self.log_dir = log_dir.into();
        self.app_name = app_name.into();
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn time_drift(&self) -> Duration {
        Duration::from_secs(self.time_drift_secs)
    }

    /// Parsed timezone.
    ///
    /// # Errors
    /// Returns `SigilError::Config` for names unknown to the tz database.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| SigilError::Config(format!("unknown timezone: {}", self.timezone)))
    }

    /// Semantic checks beyond what deserialization enforces.
    ///
    /// # Errors
    /// Returns `SigilError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(SigilError::Config("base_url must not be empty".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| SigilError::Config(format!("invalid base_url: {e}")))?;
        if self.app_key.is_empty() {
            return Err(SigilError::Config("app_key must not be empty".into()));
        }
        if self.app_key_field.is_empty() {
            return Err(SigilError::Config("app_key_field must not be empty".into()));
        }
        if self.app_secret.is_empty() {
            return Err(SigilError::Config("app_secret must not be empty".into()));
        }
        if self.max_retries == 0 {
            return Err(SigilError::Config("max_retries must be at least 1".into()));
        }
        if self.primary.timeout_ms == 0 || self.fallback.timeout_ms == 0 {
            return Err(SigilError::Config("transport timeouts must be non-zero".into()));
        }
        self.backoff.validate().map_err(|e| SigilError::Config(e.to_string()))?;
        self.tz()?;
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("app_key", &self.app_key)
            .field("app_key_field", &self.app_key_field)
            .field("app_secret", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .field("time_drift_secs", &self.time_drift_secs)
            .field("timezone", &self.timezone)
            .field("app_name", &self.app_name)
            .field("log_dir", &self.log_dir)
            .field("backoff", &self.backoff)
            .field("fallback_on_error_status", &self.fallback_on_error_status)
            .field("primary", &self.primary)
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ClientConfig {
        ClientConfig::new("https://api.example.com/v1", "key-1", "s3cret")
    }

    #[test]
    fn defaults_match_protocol_constants() {
        let config = valid();
        assert_eq!(config.app_key_field, "app_key");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.time_drift(), Duration::from_secs(300));
        assert_eq!(config.primary.timeout(), Duration::from_secs(10));
        assert_eq!(config.fallback.timeout(), Duration::from_secs(3));
        assert!(!config.primary.verify_tls);
        assert!(!config.fallback_on_error_status);
        assert_eq!(config.backoff, BackoffStrategy::None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let cases = [
            ClientConfig::new("", "k", "s"),
            ClientConfig::new("not a url", "k", "s"),
            ClientConfig::new("https://x.test", "", "s"),
            ClientConfig::new("https://x.test", "k", ""),
            valid().with_max_retries(0),
            valid().with_timezone("Mars/Olympus"),
            valid().with_app_key_field(""),
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(SigilError::Config(_))),
                "expected config error for {config:?}"
            );
        }
    }

    #[test]
    fn timezone_parses_iana_names() {
        let config = valid().with_timezone("Asia/Shanghai");
        assert_eq!(config.tz().expect("tz"), chrono_tz::Asia::Shanghai);
    }

    #[test]
    fn deserializes_minimal_toml_with_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
base_url = "https://api.example.com"
app_key = "k"
app_secret = "s"

[fallback]
timeout_ms = 1500
verify_tls = true

[backoff]
strategy = "fixed"
delay_ms = 20
"#,
        )
        .expect("parse toml");

        assert_eq!(config.app_key_field, "app_key");
        assert_eq!(config.primary, TransportConfig::primary());
        assert_eq!(config.fallback.timeout_ms, 1500);
        assert!(config.fallback.verify_tls);
        assert_eq!(config.backoff, BackoffStrategy::Fixed { delay_ms: 20 });
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }
}
