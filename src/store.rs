//! State holder and persistence plumbing.
//!
//! The core owns an in-memory [`AppState`] and funnels every mutation
//! through the reducer; after each transition the snapshot is written
//! out through a [`StateStore`]. Writes are fire-and-forget: a failed
//! save is logged and the in-memory transition is kept.

use chrono::Utc;
use serde_json::Value;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::action::Action;
use crate::core::state::AppState;
use crate::migrate::migrate;
use crate::reducer::reduce;

/// What the core needs from a persistence adapter: one key holding the
/// whole JSON-serialized snapshot. No atomicity, versioning, or partial
/// reads are required; the migration engine tolerates whatever shape
/// was saved before.
pub trait StateStore {
    /// The previously saved snapshot, or `None` if nothing was saved yet.
    fn load(&self) -> Option<String>;
    fn save(&self, raw: &str) -> io::Result<()>;
}

/// File-backed store keeping the snapshot at a single JSON path.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("monofocus")
            .join("state.json")
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn save(&self, raw: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, raw)
    }
}

/// Why an explicit import was rejected before migration ran.
///
/// These are the only user-visible errors the core produces; anything
/// that passes these minimal shape checks is absorbed by the migration
/// engine's defaulting instead of failing.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid file format: expected a JSON object")]
    NotAnObject,
    #[error("invalid file format: 'tasks' must be an array")]
    TasksNotArray,
    #[error("invalid file format: 'captures' must be an array")]
    CapturesNotArray,
    #[error("invalid file format: 'events' must be an array if present")]
    EventsNotArray,
}

/// Minimal shape check for user-supplied import payloads.
pub fn validate_import(value: &Value) -> Result<(), ImportError> {
    let Some(obj) = value.as_object() else {
        return Err(ImportError::NotAnObject);
    };
    if !obj.get("tasks").is_some_and(Value::is_array) {
        return Err(ImportError::TasksNotArray);
    }
    if !obj.get("captures").is_some_and(Value::is_array) {
        return Err(ImportError::CapturesNotArray);
    }
    if let Some(events) = obj.get("events") {
        if !events.is_array() {
            return Err(ImportError::EventsNotArray);
        }
    }
    Ok(())
}

/// The composition-root state holder: hydrates once at boot, then every
/// mutation goes `dispatch` -> reducer -> save.
pub struct AppStore<S: StateStore> {
    state: AppState,
    store: S,
}

impl<S: StateStore> AppStore<S> {
    /// Load and migrate whatever the adapter has. Undecodable JSON is
    /// logged and replaced by the default snapshot; migration itself
    /// cannot fail.
    pub fn open(store: S) -> Self {
        let state = match store.load() {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => migrate(&value, Utc::now()),
                Err(e) => {
                    log::error!("Failed to parse saved state, starting fresh: {}", e);
                    AppState::default()
                }
            },
            None => AppState::default(),
        };
        Self { state, store }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state = reduce(&self.state, action, Utc::now());
        self.persist();
    }

    fn persist(&self) {
        match serde_json::to_string(&self.state) {
            Ok(json) => {
                if let Err(e) = self.store.save(&json) {
                    log::error!("Failed to save state: {}", e);
                }
            }
            Err(e) => log::error!("Failed to serialize state: {}", e),
        }
    }

    /// The live snapshot, serialized verbatim for the user to save.
    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&self.state).unwrap_or_default()
    }

    /// Validate and import a user-supplied backup, replacing the state
    /// wholesale. State is untouched when validation rejects the payload.
    pub fn import_json(&mut self, raw: &str) -> Result<(), ImportError> {
        let value: Value = serde_json::from_str(raw)?;
        validate_import(&value)?;
        self.dispatch(Action::ImportData(value));
        Ok(())
    }
}
