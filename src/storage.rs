//! Storage adapter: typed load/save over a raw key-value backend, plus
//! whole-state export and import.
//!
//! The backend is the browser-storage-shaped collaborator from the host
//! environment: string keys, string values, writes that can refuse (quota).
//! The adapter owns the serialized representation; absent or undecodable
//! values degrade to caller-supplied defaults and are never fatal.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DatebookError, DatebookResult};
use crate::event::Event;
use crate::prefs::{Settings, Theme, ViewMode};

/// Storage keys managed by the adapter.
pub mod keys {
    pub const EVENTS: &str = "calendar-events";
    pub const THEME: &str = "calendar-theme";
    pub const SETTINGS: &str = "calendar-settings";
    pub const VIEW_MODE: &str = "calendar-view-mode";

    pub const ALL: [&str; 4] = [EVENTS, THEME, SETTINGS, VIEW_MODE];
}

/// The raw key-value primitive the host environment provides.
///
/// `set` and `remove` report refusal (e.g. quota exceeded) as `false` rather
/// than an error, matching the collaborator's own contract.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> bool;
    fn remove(&mut self, key: &str) -> bool;
    fn keys(&self) -> Vec<String>;
}

/// In-memory backend, for tests and headless use.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl StorageBackend for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.items.insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&mut self, key: &str) -> bool {
        self.items.remove(key);
        true
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

/// One structured document aggregating every managed key's current value,
/// for user-initiated backup. On import, missing fields leave the stored
/// value untouched and unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(rename = "view-mode", default, skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<ViewMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

/// Serializes and deserializes managed state to and from a backend.
pub struct StorageAdapter<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> StorageAdapter<B> {
    pub fn new(backend: B) -> Self {
        StorageAdapter { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read and decode a key, falling back to `default` when the key is
    /// absent or the stored value does not decode.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.backend.get(key) else {
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "undecodable stored value, using default");
                default
            }
        }
    }

    /// Encode and write a key. Encode failures and backend refusals both
    /// surface as `Storage` errors; neither invalidates in-memory state.
    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) -> DatebookResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| DatebookError::Storage(format!("failed to encode '{}': {}", key, e)))?;
        if self.backend.set(key, &raw) {
            Ok(())
        } else {
            warn!(key, "backend refused write");
            Err(DatebookError::Storage(format!(
                "failed to write key '{}'",
                key
            )))
        }
    }

    pub fn remove(&mut self, key: &str) -> DatebookResult<()> {
        if self.backend.remove(key) {
            Ok(())
        } else {
            Err(DatebookError::Storage(format!(
                "failed to remove key '{}'",
                key
            )))
        }
    }

    pub fn load_events(&self) -> Vec<Event> {
        self.load(keys::EVENTS, Vec::new())
    }

    pub fn save_events(&mut self, events: &[Event]) -> DatebookResult<()> {
        self.save(keys::EVENTS, &events)
    }

    pub fn load_theme(&self) -> Theme {
        self.load(keys::THEME, Theme::default())
    }

    pub fn save_theme(&mut self, theme: Theme) -> DatebookResult<()> {
        self.save(keys::THEME, &theme)
    }

    pub fn load_view_mode(&self) -> ViewMode {
        self.load(keys::VIEW_MODE, ViewMode::default())
    }

    pub fn save_view_mode(&mut self, view_mode: ViewMode) -> DatebookResult<()> {
        self.save(keys::VIEW_MODE, &view_mode)
    }

    pub fn load_settings(&self) -> Settings {
        self.load(keys::SETTINGS, Settings::default())
    }

    pub fn save_settings(&mut self, settings: &Settings) -> DatebookResult<()> {
        self.save(keys::SETTINGS, settings)
    }

    /// Read-modify-write a single setting.
    pub fn update_setting(&mut self, apply: impl FnOnce(&mut Settings)) -> DatebookResult<Settings> {
        let mut settings = self.load_settings();
        apply(&mut settings);
        self.save_settings(&settings)?;
        Ok(settings)
    }

    /// Remove every managed key.
    pub fn clear_all(&mut self) -> DatebookResult<()> {
        for key in keys::ALL {
            self.remove(key)?;
        }
        Ok(())
    }

    /// Aggregate every managed key's current value (or its default when
    /// unset) into one backup document.
    pub fn export_all(&self) -> ExportDocument {
        ExportDocument {
            events: Some(self.load_events()),
            theme: Some(self.load_theme()),
            view_mode: Some(self.load_view_mode()),
            settings: Some(self.load_settings()),
        }
    }

    /// Pretty-printed JSON form of `export_all`, for writing backup files.
    pub fn export_json(&self) -> DatebookResult<String> {
        serde_json::to_string_pretty(&self.export_all())
            .map_err(|e| DatebookError::Storage(format!("failed to encode export: {}", e)))
    }

    /// Write each recognized field of the document back through `save`.
    /// Every present field is attempted; overall success is the conjunction
    /// of the individual writes.
    pub fn import_all(&mut self, document: &ExportDocument) -> DatebookResult<()> {
        let mut failed: Vec<&str> = Vec::new();

        if let Some(events) = &document.events {
            if self.save_events(events).is_err() {
                failed.push(keys::EVENTS);
            }
        }
        if let Some(theme) = document.theme {
            if self.save_theme(theme).is_err() {
                failed.push(keys::THEME);
            }
        }
        if let Some(view_mode) = document.view_mode {
            if self.save_view_mode(view_mode).is_err() {
                failed.push(keys::VIEW_MODE);
            }
        }
        if let Some(settings) = &document.settings {
            if self.save_settings(settings).is_err() {
                failed.push(keys::SETTINGS);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DatebookError::Storage(format!(
                "import failed for keys: {}",
                failed.join(", ")
            )))
        }
    }

    /// Parse a backup document from JSON and import it.
    pub fn import_json(&mut self, json: &str) -> DatebookResult<()> {
        let document: ExportDocument = serde_json::from_str(json)
            .map_err(|e| DatebookError::Storage(format!("failed to decode import: {}", e)))?;
        self.import_all(&document)
    }
}
