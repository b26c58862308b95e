//! Protocol and configuration constants
//!
//! Reserved parameter names are part of the wire contract and must match
//! every verifier deployed against this client.

// Reserved envelope keys
pub const SIGN_KEY: &str = "_sign";
pub const TIMESTAMP_KEY: &str = "_timestamp";
pub const DEFAULT_APP_KEY_FIELD: &str = "app_key";

/// Values starting with this prefix are excluded from the signature
/// (file-upload style fields).
pub const UNSIGNED_VALUE_PREFIX: char = '@';

// Retry and replay-window defaults
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIME_DRIFT_SECS: u64 = 300;
pub const DEFAULT_TIMEZONE: &str = "UTC";

// Transport defaults
pub const PRIMARY_TIMEOUT_MS: u64 = 10_000;
pub const FALLBACK_TIMEOUT_MS: u64 = 3_000;
pub const JSON_CONTENT_TYPE: &str = "application/json";

// Unsigned passthrough requests
pub const RAW_CONNECT_TIMEOUT_SECS: u64 = 50;
pub const RAW_TIMEOUT_SECS: u64 = 300;
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const RAW_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.142 Safari/537.36";

// Diagnostics file naming: {log_dir}/{app_name}.{YYYY-MM-DD-HH}.log
pub const DEFAULT_APP_NAME: &str = "log";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DIAGNOSTICS_FILE_SUFFIX: &str = "log";
