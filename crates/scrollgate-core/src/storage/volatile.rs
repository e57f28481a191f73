//! Session-scoped volatile tier.
//!
//! Each session (one tab) owns a JSON map at `<data_dir>/sessions/<name>.json`.
//! Ending the session deletes the file, the same way closing a tab drops its
//! session storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{data_dir, KvBackend, Tier};
use crate::error::{CoreError, StoreError};

/// JSON file holding one session's entries.
#[derive(Debug)]
pub struct SessionFileKv {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl SessionFileKv {
    /// Open the named session under the default data directory.
    ///
    /// # Errors
    /// Returns an error if the name is not a plain identifier or the sessions
    /// directory cannot be created.
    pub fn open_session(name: &str) -> Result<Self, CoreError> {
        let dir = data_dir()?.join("sessions");
        Self::open_in(&dir, name)
    }

    /// Open the named session inside `dir`.
    ///
    /// # Errors
    /// Returns an error if the name is not a plain identifier or `dir` cannot
    /// be created.
    pub fn open_in(dir: &Path, name: &str) -> Result<Self, CoreError> {
        if !is_valid_session_name(name) {
            return Err(StoreError::unavailable(
                Tier::Volatile,
                format!("invalid session name: {name:?}"),
            )
            .into());
        }
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{name}.json"));
        let entries = load_entries(&path);
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop every entry and delete the backing file.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn end_session(&mut self) -> Result<(), CoreError> {
        self.entries.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| StoreError::unavailable(Tier::Volatile, e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| StoreError::unavailable(Tier::Volatile, e.to_string()))
    }
}

fn is_valid_session_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), "discarding unreadable session file: {e}");
            BTreeMap::new()
        }),
        Err(_) => BTreeMap::new(),
    }
}

impl KvBackend for SessionFileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
