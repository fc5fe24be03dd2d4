//! Runtime configuration and the settings collaborator
//!
//! `RuntimeConfig` is wiring-level configuration loaded from environment
//! variables by the binary. `ConfigStore` is the collaborator the core uses
//! for user-facing settings: the ignored-items list and the save/sync flags.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
            ConfigError::Io(e) => write!(f, "Settings file error: {}", e),
            ConfigError::Serialization(e) => write!(f, "Settings format error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serialization(err)
    }
}

/// Wiring configuration for the runtime binary, loaded from the environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Remote loot store endpoint; submission is disabled when unset.
    pub store_url: Option<String>,
    /// Session identity for the loot store; no client exists without one.
    pub session_token: Option<String>,
    /// Bulk item metadata feed; valuation degrades to placeholders when unset.
    pub item_api_url: Option<String>,
    pub settings_path: String,
    pub submit_interval_secs: u64,
    pub price_refresh_secs: u64,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_url = env::var("LOOT_STORE_URL").ok();
        if let Some(url) = &store_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "LOOT_STORE_URL must start with http:// or https://".to_string(),
                ));
            }
        }

        let session_token = env::var("SESSION_TOKEN").ok();

        let item_api_url = env::var("ITEM_API_URL").ok();
        if let Some(url) = &item_api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "ITEM_API_URL must start with http:// or https://".to_string(),
                ));
            }
        }

        let settings_path =
            env::var("SETTINGS_PATH").unwrap_or_else(|_| "lootflow_settings.json".to_string());

        let submit_interval_secs = env::var("SUBMIT_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .unwrap_or(300);

        let price_refresh_secs = env::var("PRICE_REFRESH_SECS")
            .unwrap_or_else(|_| "1800".to_string())
            .parse::<u64>()
            .unwrap_or(1800);

        Ok(Self {
            store_url,
            session_token,
            item_api_url,
            settings_path,
            submit_interval_secs,
            price_refresh_secs,
        })
    }
}

fn default_true() -> bool {
    true
}

/// User-facing tracker settings, persisted by the config store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSettings {
    #[serde(default)]
    pub ignored_items: String,
    #[serde(default = "default_true")]
    pub save_loot: bool,
    #[serde(default = "default_true")]
    pub sync_panel: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            ignored_items: String::new(),
            save_loot: true,
            sync_panel: true,
        }
    }
}

/// Settings collaborator consumed by the core.
pub trait ConfigStore: Send + Sync {
    /// Ignored item names as a comma-separated list.
    fn ignored_items(&self) -> String;

    /// Persist the ignored-items list synchronously.
    fn set_ignored_items(&self, csv: &str) -> Result<(), ConfigError>;

    /// Whether resolved records are queued for remote submission.
    fn save_loot(&self) -> bool;

    /// Whether stored history is replayed into the display at startup.
    fn sync_panel(&self) -> bool;
}

/// JSON-file-backed settings store used by the runtime.
pub struct JsonFileConfigStore {
    path: PathBuf,
    state: Mutex<TrackerSettings>,
}

impl JsonFileConfigStore {
    /// Load settings from `path`, falling back to defaults when the file
    /// does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TrackerSettings::default(),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn persist(&self, state: &TrackerSettings) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn ignored_items(&self) -> String {
        self.state.lock().unwrap().ignored_items.clone()
    }

    fn set_ignored_items(&self, csv: &str) -> Result<(), ConfigError> {
        let mut state = self.state.lock().unwrap();
        state.ignored_items = csv.to_string();
        self.persist(&state)
    }

    fn save_loot(&self) -> bool {
        self.state.lock().unwrap().save_loot
    }

    fn sync_panel(&self) -> bool {
        self.state.lock().unwrap().sync_panel
    }
}

/// In-memory settings store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    state: Mutex<TrackerSettings>,
}

impl MemoryConfigStore {
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            state: Mutex::new(settings),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn ignored_items(&self) -> String {
        self.state.lock().unwrap().ignored_items.clone()
    }

    fn set_ignored_items(&self, csv: &str) -> Result<(), ConfigError> {
        self.state.lock().unwrap().ignored_items = csv.to_string();
        Ok(())
    }

    fn save_loot(&self) -> bool {
        self.state.lock().unwrap().save_loot
    }

    fn sync_panel(&self) -> bool {
        self.state.lock().unwrap().sync_panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_starts_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let store = JsonFileConfigStore::load(&path).unwrap();

        assert_eq!(store.ignored_items(), "");
        assert!(store.save_loot());
        assert!(store.sync_panel());
    }

    #[test]
    fn test_file_store_persists_ignored_items() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let store = JsonFileConfigStore::load(&path).unwrap();
        store.set_ignored_items("Bones,Coins").unwrap();
        drop(store);

        let reloaded = JsonFileConfigStore::load(&path).unwrap();
        assert_eq!(reloaded.ignored_items(), "Bones,Coins");
    }

    #[test]
    fn test_settings_missing_fields_default() {
        let settings: TrackerSettings = serde_json::from_str("{}").unwrap();

        assert_eq!(settings.ignored_items, "");
        assert!(settings.save_loot);
        assert!(settings.sync_panel);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryConfigStore::new(TrackerSettings {
            ignored_items: "Vial".to_string(),
            save_loot: false,
            sync_panel: true,
        });

        assert_eq!(store.ignored_items(), "Vial");
        assert!(!store.save_loot());

        store.set_ignored_items("Vial,Ashes").unwrap();
        assert_eq!(store.ignored_items(), "Vial,Ashes");
    }
}
