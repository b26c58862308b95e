//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;

use sigil_common::resilience::BackoffStrategy;
use sigil_domain::SigilError;
use sigil_infra::config;
use tempfile::NamedTempFile;

fn write_with_extension(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    (temp_file, path)
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "base_url": "https://api.example.com/v2",
        "app_key": "json-app",
        "app_secret": "json-secret",
        "app_key_field": "appid",
        "max_retries": 4,
        "timezone": "Asia/Shanghai",
        "app_name": "orders",
        "log_dir": "/tmp/sigil-logs",
        "fallback_on_error_status": true,
        "primary": { "timeout_ms": 5000, "verify_tls": true },
        "fallback": { "timeout_ms": 1000, "debug_capture": true }
    }"#;

    let (_temp, path) = write_with_extension(json_content, "json");

    let config = config::load_from_file(Some(path.clone())).expect("JSON config");

    assert_eq!(config.base_url, "https://api.example.com/v2");
    assert_eq!(config.app_key, "json-app");
    assert_eq!(config.app_key_field, "appid");
    assert_eq!(config.max_retries, 4);
    assert_eq!(config.timezone, "Asia/Shanghai");
    assert_eq!(config.app_name, "orders");
    assert_eq!(config.log_dir, PathBuf::from("/tmp/sigil-logs"));
    assert!(config.fallback_on_error_status);
    assert_eq!(config.primary.timeout_ms, 5000);
    assert!(config.primary.verify_tls);
    assert!(config.fallback.debug_capture);
    assert_eq!(config.backoff, BackoffStrategy::None);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
base_url = "https://api.example.com"
app_key = "toml-app"
app_secret = "toml-secret"
time_drift_secs = 120

[backoff]
strategy = "exponential"
initial_delay_ms = 100
base = 2.0
max_delay_ms = 1000

[primary]
timeout_ms = 8000
"#;

    let (_temp, path) = write_with_extension(toml_content, "toml");

    let config = config::load_from_file(Some(path.clone())).expect("TOML config");

    assert_eq!(config.app_key, "toml-app");
    assert_eq!(config.time_drift_secs, 120);
    assert_eq!(config.primary.timeout_ms, 8000);
    assert_eq!(config.fallback.timeout_ms, 3000);
    assert_eq!(config.max_retries, 3);
    assert!(matches!(config.backoff, BackoffStrategy::Exponential { .. }));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_file_config_is_validated() {
    let json_content = r#"{
        "base_url": "not a url",
        "app_key": "k",
        "app_secret": "s"
    }"#;

    let (_temp, path) = write_with_extension(json_content, "json");

    let result = config::load_from_file(Some(path.clone()));
    assert!(matches!(result, Err(SigilError::Config(ref msg)) if msg.contains("base_url")));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_missing_required_field_is_rejected() {
    let (_temp, path) = write_with_extension(r#"{ "base_url": "https://a.test" }"#, "json");

    let result = config::load_from_file(Some(path.clone()));
    assert!(matches!(result, Err(SigilError::Config(ref msg)) if msg.contains("Invalid JSON")));

    std::fs::remove_file(path).ok();
}
