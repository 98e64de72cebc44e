//! Configuration management
//!
//! This module handles loading, validation, and management of the static Quill
//! configuration. Configuration is stored in TOML format at ~/.quill/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory
//! - **relay**: AI relay endpoint and token validation wait
//! - **ai**: Default model and the list of selectable models
//! - **chat**: Chat resource endpoint, poll cadence, scroll debounce window
//!
//! User-mutable state (processing mode, selected model, chat identity, last
//! room, scroll offsets) lives in the settings store, not here.
//!
//! # Examples
//!
//! ```no_run
//! use quill_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Relay: {}", config.relay.base_url);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use sdk::types::ModelId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    pub core: CoreConfig,

    /// AI relay settings
    #[serde(default)]
    pub relay: RelayConfig,

    /// Model selection
    #[serde(default)]
    pub ai: AiConfig,

    /// Chat resource settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// AI relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base URL of the relay that forwards prompts to the model
    #[serde(default = "default_relay_base_url")]
    pub base_url: String,

    /// How long token validation may wait before the token counts as invalid
    #[serde(default = "default_token_validation_timeout_ms")]
    pub token_validation_timeout_ms: u64,
    // Note: the relay token is stored in the OS keychain, not in config
}

/// Model selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Model used when the user has not picked one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Models offered for selection
    #[serde(default = "default_models")]
    pub models: Vec<String>,
}

/// Chat resource configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the room resource
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,

    /// Poll cadence in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Window within which only the last scroll event is persisted
    #[serde(default = "default_scroll_debounce_ms")]
    pub scroll_debounce_ms: u64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.quill")
}

fn default_relay_base_url() -> String {
    "http://localhost:8787".to_string()
}

fn default_token_validation_timeout_ms() -> u64 {
    5000
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "gpt-4o-mini".to_string(),
        "gpt-4o".to_string(),
        "o3-mini".to_string(),
    ]
}

fn default_chat_base_url() -> String {
    "http://localhost:8787/chat".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_scroll_debounce_ms() -> u64 {
    250
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: default_relay_base_url(),
            token_validation_timeout_ms: default_token_validation_timeout_ms(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            models: default_models(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            scroll_debounce_ms: default_scroll_debounce_ms(),
        }
    }
}

impl RelayConfig {
    /// Token validation wait as a `Duration`
    pub fn token_validation_timeout(&self) -> Duration {
        Duration::from_millis(self.token_validation_timeout_ms)
    }
}

impl AiConfig {
    /// The default model as a typed identifier
    pub fn default_model_id(&self) -> ModelId {
        ModelId::new(self.default_model.clone())
    }

    /// Whether `model` is one of the selectable models
    pub fn is_known(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

impl ChatConfig {
    /// Poll cadence as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Scroll debounce window as a `Duration`
    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// Load configuration from the default location (~/.quill/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();

        // Serialize before processing so the file keeps the portable ~ form
        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.quill/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".quill").join("config.toml"))
    }

    /// Create a default configuration
    fn default_config() -> Self {
        Self {
            core: CoreConfig::default(),
            relay: RelayConfig::default(),
            ai: AiConfig::default(),
            chat: ChatConfig::default(),
        }
    }

    /// Path of the settings store inside the data directory
    pub fn settings_path(&self) -> PathBuf {
        self.core.data_dir.join("settings.json")
    }

    /// Validate and process configuration
    ///
    /// Validates enumerated fields, expands ~ in the data directory and
    /// creates it when missing.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.ai.models.is_empty() {
            return Err(EngineError::Config(
                "ai.models must list at least one model".to_string(),
            ));
        }
        if !self.ai.is_known(&self.ai.default_model) {
            return Err(EngineError::Config(format!(
                "Default model '{}' is not listed in ai.models",
                self.ai.default_model
            )));
        }

        if self.chat.poll_interval_ms == 0 {
            return Err(EngineError::Config(
                "chat.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        for (name, url) in [
            ("relay.base_url", &self.relay.base_url),
            ("chat.base_url", &self.chat.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EngineError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;

        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                EngineError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.chat.poll_interval_ms, 500);
        assert_eq!(config.relay.token_validation_timeout_ms, 5000);
        assert!(config.ai.is_known(&config.ai.default_model));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default_config();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.ai.models, deserialized.ai.models);
    }

    #[test]
    fn test_unknown_default_model_rejected() {
        let mut config = Config::default_config();
        config.ai.default_model = "not-a-model".to_string();
        config.core.data_dir = std::env::temp_dir();

        let err = config.validate_and_process().unwrap_err();
        assert!(err.to_string().contains("not listed"));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let mut config = Config::default_config();
        config.chat.base_url = "ftp://example.com".to_string();
        config.core.data_dir = std::env::temp_dir();

        let err = config.validate_and_process().unwrap_err();
        assert!(err.to_string().contains("chat.base_url"));
    }
}
