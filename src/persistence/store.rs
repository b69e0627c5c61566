//! Key/value stores backing the repositories.
//!
//! # File format
//! ```json
//! { "savedAt": "2026-01-01T00:00:00Z", "entries": { "_aplViewport": { ... } } }
//! ```
//! Every `set` rewrites the whole file: the JSON is written to `<file>.tmp`
//! next to the target and renamed over it, so a failed write leaves the
//! previous file intact.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json::JsonType;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state store I/O error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },
    #[error("state store is corrupt: {0}")]
    Corrupt(String),
    #[error("state store lock poisoned")]
    Poisoned,
}

/// Untyped persisted state, one JSON value per key.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<JsonType>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

// ── FileStore ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    saved_at: String,
    entries: JsonType,
}

/// Store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<JsonType>,
}

impl FileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let file: StoreFile = serde_json::from_str(&text)
                    .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
                tracing::debug!(
                    "opened state store {} (saved {})",
                    path.display(),
                    file.saved_at
                );
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => JsonType::new(),
            Err(e) => {
                return Err(StoreError::Io {
                    path,
                    reason: e.to_string(),
                })
            }
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, entries: &JsonType) -> Result<(), StoreError> {
        let file = StoreFile {
            saved_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            entries: entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let file_name = self
            .path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let tmp_path = self.path.with_file_name(format!("{file_name}.tmp"));
        let io_err = |e: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        if let Err(e) = std::fs::write(&tmp_path, json) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(io_err(e));
        }
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            io_err(e)
        })
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// The in-memory entry only changes once the file write has succeeded.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        self.save(&next)?;
        *entries = next;
        Ok(())
    }
}
