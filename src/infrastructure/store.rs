//! Forest store implementations: a JSON file and an in-memory cell.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::EntityData;
use crate::infrastructure::traits::{FileSystem, ForestStore};

fn invalid_data(e: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Stored array: forests first, then the retained raw entries. `None` when both are empty.
fn payload(forests: &[EntityData], retained: &[Value]) -> io::Result<Option<Value>> {
    if forests.is_empty() && retained.is_empty() {
        return Ok(None);
    }
    let mut items = forests
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid_data)?;
    items.extend(retained.iter().cloned());
    Ok(Some(Value::Array(items)))
}

/// Stores the whole collection as one pretty-printed JSON array.
pub struct JsonFileStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ForestStore for JsonFileStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> io::Result<Option<Value>> {
        if !self.fs.is_file(&self.path) {
            debug!("no stored forests yet");
            return Ok(None);
        }
        let content = self.fs.read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content).map(Some).map_err(invalid_data)
    }

    #[instrument(level = "debug", skip(self, forests, retained), fields(path = %self.path.display(), count = forests.len(), retained = retained.len()))]
    fn save(&self, forests: &[EntityData], retained: &[Value]) -> io::Result<()> {
        let Some(payload) = payload(forests, retained)? else {
            if self.fs.exists(&self.path) {
                self.fs.remove_file(&self.path)?;
            }
            return Ok(());
        };

        let content = serde_json::to_string_pretty(&payload).map_err(invalid_data)?;
        let staging = self.staging_path();
        self.fs.ensure_parent(&self.path)?;
        self.fs.write(&staging, &content)?;
        self.fs.rename(&staging, &self.path)
    }
}

/// Keeps the serialized collection in memory. Used by tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    cell: Arc<Mutex<Option<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already persisted payload.
    pub fn with_payload(payload: Value) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(payload))),
        }
    }

    /// Current payload, as it would have been written to disk.
    pub fn payload(&self) -> Option<Value> {
        self.cell.lock().ok().and_then(|guard| guard.clone())
    }
}

fn poisoned<T>(_: T) -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory store lock poisoned")
}

impl ForestStore for MemoryStore {
    fn load(&self) -> io::Result<Option<Value>> {
        Ok(self.cell.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, forests: &[EntityData], retained: &[Value]) -> io::Result<()> {
        let payload = payload(forests, retained)?;
        *self.cell.lock().map_err(poisoned)? = payload;
        Ok(())
    }
}
