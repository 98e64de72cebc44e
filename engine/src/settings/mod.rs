//! Persisted user settings
//!
//! A small key-value store for the state the user changes at runtime:
//! processing mode, selected model, chat identity, last joined room, the
//! auto-scroll toggle and per-room scroll offsets. Values are read when a
//! panel opens and written as soon as they change.
//!
//! `SettingsStore` is the storage seam. `FileStore` keeps a JSON object on
//! disk and `MemoryStore` backs tests. `Settings` layers typed accessors on
//! top of either.

use sdk::errors::EngineError;
use sdk::types::ModelId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::AiConfig;

const KEY_PROCESSING_MODE: &str = "processing_mode";
const KEY_MODEL: &str = "ai_model";
const KEY_CHAT_IDENTITY: &str = "chat_identity";
const KEY_CHAT_ROOM: &str = "chat_room";
const KEY_AUTO_SCROLL: &str = "chat_auto_scroll";
const SCROLL_PREFIX: &str = "chat_scroll.";

/// Storage seam for persisted settings
pub trait SettingsStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value
    fn set(&self, key: &str, value: Value) -> Result<(), EngineError>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), EngineError>;
}

/// In-memory store, used by tests and as a fallback
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), EngineError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| EngineError::Settings("settings lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), EngineError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| EngineError::Settings("settings lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}

/// JSON-file store
///
/// The whole object is cached in memory and rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    ///
    /// # Errors
    /// Returns `EngineError::Settings` if the file exists but is not a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&contents) {
                    Ok(Value::Object(map)) => map,
                    Ok(_) => {
                        return Err(EngineError::Settings(format!(
                            "{} does not contain a JSON object",
                            path.display()
                        )))
                    }
                    Err(e) => {
                        return Err(EngineError::Settings(format!(
                            "Failed to parse {}: {}",
                            path.display(),
                            e
                        )))
                    }
                }
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| EngineError::Settings(format!("Failed to serialize settings: {}", e)))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), EngineError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| EngineError::Settings("settings lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), EngineError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| EngineError::Settings("settings lock poisoned".to_string()))?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

/// How directives are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// One popup per directive, anchored at the directive
    #[default]
    #[serde(rename = "v1")]
    PerAnchor,

    /// All results collected into one carousel
    #[serde(rename = "v2")]
    Batch,
}

impl std::str::FromStr for ProcessingMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" | "per-anchor" => Ok(Self::PerAnchor),
            "v2" | "batch" => Ok(Self::Batch),
            other => Err(EngineError::Settings(format!(
                "Unknown processing mode '{}'. Use v1 or v2",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerAnchor => write!(f, "v1"),
            Self::Batch => write!(f, "v2"),
        }
    }
}

/// Typed view over a `SettingsStore`
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn SettingsStore>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings").finish_non_exhaustive()
    }
}

impl Settings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Settings backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.store
            .get(key)
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.trim().is_empty())
    }

    pub fn processing_mode(&self) -> ProcessingMode {
        self.store
            .get(KEY_PROCESSING_MODE)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn set_processing_mode(&self, mode: ProcessingMode) -> Result<(), EngineError> {
        self.store
            .set(KEY_PROCESSING_MODE, Value::String(mode.to_string()))
    }

    /// The selected model, falling back to the configured default when the
    /// stored choice is missing or no longer offered
    pub fn model(&self, ai: &AiConfig) -> ModelId {
        match self.get_string(KEY_MODEL) {
            Some(model) if ai.is_known(&model) => ModelId::new(model),
            Some(model) => {
                tracing::warn!("Stored model '{}' is no longer offered, using default", model);
                ai.default_model_id()
            }
            None => ai.default_model_id(),
        }
    }

    /// Select a model
    ///
    /// # Errors
    /// Returns `EngineError::UnknownModel` if `model` is not listed in `ai.models`.
    pub fn set_model(&self, ai: &AiConfig, model: &str) -> Result<(), EngineError> {
        if !ai.is_known(model) {
            return Err(EngineError::UnknownModel(model.to_string()));
        }
        self.store.set(KEY_MODEL, Value::String(model.to_string()))
    }

    /// The configured chat identity; blank identities count as missing
    pub fn chat_identity(&self) -> Option<String> {
        self.get_string(KEY_CHAT_IDENTITY).map(|s| s.trim().to_string())
    }

    pub fn set_chat_identity(&self, identity: &str) -> Result<(), EngineError> {
        self.store
            .set(KEY_CHAT_IDENTITY, Value::String(identity.trim().to_string()))
    }

    pub fn last_room(&self) -> Option<String> {
        self.get_string(KEY_CHAT_ROOM)
    }

    pub fn set_last_room(&self, room: Option<&str>) -> Result<(), EngineError> {
        match room {
            Some(room) => self.store.set(KEY_CHAT_ROOM, Value::String(room.to_string())),
            None => self.store.remove(KEY_CHAT_ROOM),
        }
    }

    pub fn auto_scroll(&self) -> bool {
        self.store
            .get(KEY_AUTO_SCROLL)
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    pub fn set_auto_scroll(&self, enabled: bool) -> Result<(), EngineError> {
        self.store.set(KEY_AUTO_SCROLL, Value::Bool(enabled))
    }

    pub fn scroll_offset(&self, room: &str) -> Option<f64> {
        self.store
            .get(&format!("{}{}", SCROLL_PREFIX, room))
            .and_then(|v| v.as_f64())
    }

    pub fn set_scroll_offset(&self, room: &str, offset: f64) -> Result<(), EngineError> {
        let value = serde_json::Number::from_f64(offset)
            .map(Value::Number)
            .ok_or_else(|| EngineError::Settings(format!("Invalid scroll offset {}", offset)))?;
        self.store.set(&format!("{}{}", SCROLL_PREFIX, room), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_processing_mode_defaults_to_per_anchor() {
        let settings = Settings::in_memory();
        assert_eq!(settings.processing_mode(), ProcessingMode::PerAnchor);

        settings.set_processing_mode(ProcessingMode::Batch).unwrap();
        assert_eq!(settings.processing_mode(), ProcessingMode::Batch);
    }

    #[test]
    fn test_processing_mode_parse() {
        assert_eq!("v1".parse::<ProcessingMode>().unwrap(), ProcessingMode::PerAnchor);
        assert_eq!("batch".parse::<ProcessingMode>().unwrap(), ProcessingMode::Batch);
        assert!("v3".parse::<ProcessingMode>().is_err());
    }

    #[test]
    fn test_model_selection_validated() {
        let ai = AiConfig::default();
        let settings = Settings::in_memory();

        assert_eq!(settings.model(&ai), ai.default_model_id());
        assert!(matches!(
            settings.set_model(&ai, "mystery"),
            Err(EngineError::UnknownModel(_))
        ));

        settings.set_model(&ai, "gpt-4o").unwrap();
        assert_eq!(settings.model(&ai).as_str(), "gpt-4o");
    }

    #[test]
    fn test_blank_identity_is_missing() {
        let settings = Settings::in_memory();
        settings.set_chat_identity("   ").unwrap();
        assert_eq!(settings.chat_identity(), None);

        settings.set_chat_identity(" ada ").unwrap();
        assert_eq!(settings.chat_identity(), Some("ada".to_string()));
    }

    #[test]
    fn test_scroll_offsets_are_per_room() {
        let settings = Settings::in_memory();
        settings.set_scroll_offset("lobby", 120.0).unwrap();

        assert_eq!(settings.scroll_offset("lobby"), Some(120.0));
        assert_eq!(settings.scroll_offset("other"), None);
    }

    #[test]
    fn test_last_room_cleared() {
        let settings = Settings::in_memory();
        settings.set_last_room(Some("lobby")).unwrap();
        assert_eq!(settings.last_room(), Some("lobby".to_string()));

        settings.set_last_room(None).unwrap();
        assert_eq!(settings.last_room(), None);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("chat_room", Value::String("lobby".into())).unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("chat_room"), Some(Value::String("lobby".into())));
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(FileStore::open(&path), Err(EngineError::Settings(_))));
    }
}
