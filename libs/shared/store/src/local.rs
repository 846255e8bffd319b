use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt data under key '{key}': {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("failed to encode records for key '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

enum Backend {
    /// One JSON document per key, stored as `<dir>/<namespace>_<key>.json`.
    Disk { dir: PathBuf },
    /// Process-local map, used by tests and ephemeral tooling.
    Memory(Mutex<HashMap<String, String>>),
}

/// Namespaced string key/value store backing every domain collection.
///
/// There are no partial writes above this layer: callers read a whole
/// value, rebuild it in memory and write it back. Last write wins.
pub struct LocalStore {
    namespace: String,
    backend: Backend,
}

impl LocalStore {
    /// Open (creating if needed) a directory-backed store.
    pub fn open(dir: impl AsRef<Path>, namespace: &str) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Opened record store at {}", dir.display());

        Ok(Self {
            namespace: namespace.to_string(),
            backend: Backend::Disk { dir },
        })
    }

    pub fn in_memory() -> Self {
        Self {
            namespace: "clinic".to_string(),
            backend: Backend::Memory(Mutex::new(HashMap::new())),
        }
    }

    fn qualified(&self, key: &str) -> String {
        format!("{}_{}", self.namespace, key)
    }

    fn file_path(dir: &Path, qualified: &str) -> PathBuf {
        dir.join(format!("{}.json", qualified))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let qualified = self.qualified(key);
        match &self.backend {
            Backend::Disk { dir } => match fs::read_to_string(Self::file_path(dir, &qualified)) {
                Ok(raw) => Ok(Some(raw)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
            Backend::Memory(map) => {
                let map = map.lock().unwrap_or_else(|e| e.into_inner());
                Ok(map.get(&qualified).cloned())
            }
        }
    }

    pub fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let qualified = self.qualified(key);
        debug!("Writing {} ({} bytes)", qualified, value.len());
        match &self.backend {
            Backend::Disk { dir } => {
                fs::write(Self::file_path(dir, &qualified), value)?;
                Ok(())
            }
            Backend::Memory(map) => {
                let mut map = map.lock().unwrap_or_else(|e| e.into_inner());
                map.insert(qualified, value.to_string());
                Ok(())
            }
        }
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let qualified = self.qualified(key);
        match &self.backend {
            Backend::Disk { dir } => match fs::remove_file(Self::file_path(dir, &qualified)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            Backend::Memory(map) => {
                let mut map = map.lock().unwrap_or_else(|e| e.into_inner());
                map.remove(&qualified);
                Ok(())
            }
        }
    }
}
