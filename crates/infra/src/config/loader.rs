//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `SIGIL_BASE_URL`: Service base URL
//! - `SIGIL_APP_KEY`: Application key sent with every request
//! - `SIGIL_APP_SECRET`: Shared signing secret
//!
//! Optional:
//! - `SIGIL_APP_KEY_FIELD`: Parameter name for the app key (default `app_key`)
//! - `SIGIL_MAX_RETRIES`: Attempts per call (default 3)
//! - `SIGIL_TIME_DRIFT_SECS`: Accepted timestamp skew (default 300)
//! - `SIGIL_TIMEZONE`: IANA zone for `_timestamp` (default `UTC`)
//! - `SIGIL_APP_NAME`: Diagnostics file prefix (default `log`)
//! - `SIGIL_LOG_DIR`: Diagnostics directory (default `logs`)
//! - `SIGIL_PRIMARY_TIMEOUT_MS`: Primary transport timeout (default 10000)
//! - `SIGIL_FALLBACK_TIMEOUT_MS`: Fallback transport timeout (default 3000)
//! - `SIGIL_VERIFY_TLS`: Verify certificates on both transports (default
//!   false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./sigil.json` or `./sigil.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use sigil_domain::{ClientConfig, Result, SigilError};

const CONFIG_FILE_NAMES: [&str; 4] = ["sigil.json", "sigil.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SigilError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation fails
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Required variables must be present; optional ones fall back to their
/// defaults.
///
/// # Errors
/// Returns `SigilError::Config` if required variables are missing, a value
/// does not parse, or validation fails.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(
        env_var("SIGIL_BASE_URL")?,
        env_var("SIGIL_APP_KEY")?,
        env_var("SIGIL_APP_SECRET")?,
    );

    if let Some(field) = env_opt("SIGIL_APP_KEY_FIELD") {
        config.app_key_field = field;
    }
    if let Some(retries) = env_parse::<u32>("SIGIL_MAX_RETRIES")? {
        config.max_retries = retries;
    }
    if let Some(drift) = env_parse::<u64>("SIGIL_TIME_DRIFT_SECS")? {
        config.time_drift_secs = drift;
    }
    if let Some(timezone) = env_opt("SIGIL_TIMEZONE") {
        config.timezone = timezone;
    }
    if let Some(app_name) = env_opt("SIGIL_APP_NAME") {
        config.app_name = app_name;
    }
    if let Some(log_dir) = env_opt("SIGIL_LOG_DIR") {
        config.log_dir = PathBuf::from(log_dir);
    }
    if let Some(timeout) = env_parse::<u64>("SIGIL_PRIMARY_TIMEOUT_MS")? {
        config.primary.timeout_ms = timeout;
    }
    if let Some(timeout) = env_parse::<u64>("SIGIL_FALLBACK_TIMEOUT_MS")? {
        config.fallback.timeout_ms = timeout;
    }
    let verify_tls = env_bool("SIGIL_VERIFY_TLS", false);
    config.primary.verify_tls = verify_tls;
    config.fallback.verify_tls = verify_tls;

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SigilError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SigilError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SigilError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SigilError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SigilError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SigilError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SigilError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| SigilError::Config(format!("Missing required environment variable: {key}")))
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional variable; set but malformed is an error.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| SigilError::Config(format!("Invalid {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 12] = [
        "SIGIL_BASE_URL",
        "SIGIL_APP_KEY",
        "SIGIL_APP_SECRET",
        "SIGIL_APP_KEY_FIELD",
        "SIGIL_MAX_RETRIES",
        "SIGIL_TIME_DRIFT_SECS",
        "SIGIL_TIMEZONE",
        "SIGIL_APP_NAME",
        "SIGIL_LOG_DIR",
        "SIGIL_PRIMARY_TIMEOUT_MS",
        "SIGIL_FALLBACK_TIMEOUT_MS",
        "SIGIL_VERIFY_TLS",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn set_required() {
        std::env::set_var("SIGIL_BASE_URL", "https://api.example.com");
        std::env::set_var("SIGIL_APP_KEY", "app-1");
        std::env::set_var("SIGIL_APP_SECRET", "s3cret");
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for value in ["1", "true", "yes", "on", "TRUE"] {
            std::env::set_var("SIGIL_TEST_BOOL", value);
            assert!(env_bool("SIGIL_TEST_BOOL", false), "{value}");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("SIGIL_TEST_BOOL", value);
            assert!(!env_bool("SIGIL_TEST_BOOL", true), "{value}");
        }

        std::env::remove_var("SIGIL_TEST_BOOL");
        assert!(env_bool("SIGIL_TEST_BOOL", true));
        assert!(!env_bool("SIGIL_TEST_BOOL", false));
    }

    #[test]
    fn test_load_from_env_required_only() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required();

        let config = load_from_env().expect("config from env");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.app_key, "app-1");
        assert_eq!(config.app_secret, "s3cret");
        assert_eq!(config.app_key_field, "app_key");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.primary.timeout_ms, 10_000);
        assert_eq!(config.fallback.timeout_ms, 3_000);
        assert!(!config.primary.verify_tls);

        clear_env();
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required();
        std::env::set_var("SIGIL_APP_KEY_FIELD", "appid");
        std::env::set_var("SIGIL_MAX_RETRIES", "5");
        std::env::set_var("SIGIL_TIME_DRIFT_SECS", "60");
        std::env::set_var("SIGIL_TIMEZONE", "Asia/Shanghai");
        std::env::set_var("SIGIL_APP_NAME", "billing");
        std::env::set_var("SIGIL_LOG_DIR", "/var/log/billing");
        std::env::set_var("SIGIL_PRIMARY_TIMEOUT_MS", "2500");
        std::env::set_var("SIGIL_FALLBACK_TIMEOUT_MS", "1500");
        std::env::set_var("SIGIL_VERIFY_TLS", "yes");

        let config = load_from_env().expect("config from env");
        assert_eq!(config.app_key_field, "appid");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.time_drift_secs, 60);
        assert_eq!(config.timezone, "Asia/Shanghai");
        assert_eq!(config.app_name, "billing");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/billing"));
        assert_eq!(config.primary.timeout_ms, 2500);
        assert_eq!(config.fallback.timeout_ms, 1500);
        assert!(config.primary.verify_tls && config.fallback.verify_tls);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("SIGIL_BASE_URL", "https://api.example.com");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, SigilError::Config(ref msg) if msg.contains("SIGIL_APP_KEY")));

        clear_env();
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required();
        std::env::set_var("SIGIL_MAX_RETRIES", "lots");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, SigilError::Config(ref msg) if msg.contains("SIGIL_MAX_RETRIES")));

        clear_env();
    }

    #[test]
    fn test_load_from_env_rejects_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required();
        std::env::set_var("SIGIL_TIMEZONE", "Mars/Olympus");

        assert!(matches!(load_from_env(), Err(SigilError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/sigil.json")));
        assert!(matches!(result, Err(SigilError::Config(_))));
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{
            "base_url": "https://api.example.com",
            "app_key": "k",
            "app_secret": "s",
            "max_retries": 2,
            "fallback": { "timeout_ms": 500 }
        }"#;

        let config = parse_config(json_content, &PathBuf::from("sigil.json")).expect("json");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.fallback.timeout_ms, 500);
        assert_eq!(config.primary.timeout_ms, 10_000);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
base_url = "https://api.example.com"
app_key = "k"
app_secret = "s"
timezone = "Europe/Berlin"

[backoff]
strategy = "fixed"
delay_ms = 250
"#;

        let config = parse_config(toml_content, &PathBuf::from("sigil.toml")).expect("toml");
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(
            config.backoff,
            sigil_common::resilience::BackoffStrategy::Fixed { delay_ms: 250 }
        );
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("sigil.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
