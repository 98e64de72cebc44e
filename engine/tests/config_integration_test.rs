//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be properly loaded,
//! validated, and processed with path expansion.

use quill_engine::config::Config;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_full_config_parsing() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let path = write_config(
        &dir,
        &format!(
            r#"
[core]
log_level = "debug"
data_dir = "{}"

[relay]
base_url = "https://relay.example.com/"
token_validation_timeout_ms = 1500

[ai]
default_model = "gpt-4o"
models = ["gpt-4o", "o3-mini"]

[chat]
base_url = "https://chat.example.com"
poll_interval_ms = 750
scroll_debounce_ms = 100
"#,
            data_dir.display()
        ),
    );

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.core.log_level, "debug");
    assert!(data_dir.exists(), "data directory is created on load");
    assert_eq!(config.settings_path(), data_dir.join("settings.json"));
    assert_eq!(
        config.relay.token_validation_timeout(),
        Duration::from_millis(1500)
    );
    assert_eq!(config.ai.default_model_id().as_str(), "gpt-4o");
    assert!(!config.ai.is_known("gpt-4o-mini"));
    assert_eq!(config.chat.poll_interval(), Duration::from_millis(750));
    assert_eq!(config.chat.scroll_debounce(), Duration::from_millis(100));
}

#[test]
fn test_minimal_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            "[core]\ndata_dir = \"{}\"\n",
            dir.path().join("data").display()
        ),
    );

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.core.log_level, "info");
    assert_eq!(config.relay.token_validation_timeout(), Duration::from_secs(5));
    assert_eq!(config.chat.poll_interval(), Duration::from_millis(500));
    assert!(config.ai.is_known(&config.ai.default_model));
}

#[test]
fn test_default_model_must_be_offered() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            "[core]\ndata_dir = \"{}\"\n\n[ai]\ndefault_model = \"mystery\"\nmodels = [\"gpt-4o\"]\n",
            dir.path().join("data").display()
        ),
    );

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("mystery"));
}

#[test]
fn test_zero_poll_interval_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            "[core]\ndata_dir = \"{}\"\n\n[chat]\npoll_interval_ms = 0\n",
            dir.path().join("data").display()
        ),
    );

    assert!(Config::load_from_path(&path).is_err());
}

#[test]
fn test_malformed_toml_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[core\nlog_level = ");
    assert!(Config::load_from_path(&path).is_err());
}

#[test]
fn test_missing_file_rejected() {
    let dir = TempDir::new().unwrap();
    assert!(Config::load_from_path(&dir.path().join("absent.toml")).is_err());
}
