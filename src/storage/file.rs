//! File-backed consent store.
//!
//! The whole map lives in one JSON document; every mutation rewrites the
//! file. Consent payloads are small, so durability wins over write batching.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use serde_json::Value;

use crate::error::{SdkError, SdkResult};

use super::ConsentStore;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RwLock<HashMap<String, Value>>,
}

impl FileStore {
    /// Opens the store at `path`, loading any existing document. A missing
    /// file is an empty store; a corrupt file is a protocol error.
    pub fn open(path: impl Into<PathBuf>) -> SdkResult<Self> {
        let path = path.into();
        let data = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|error| {
                SdkError::Protocol(format!(
                    "consent store file {} is corrupt: {error}",
                    path.display()
                ))
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => {
                return Err(SdkError::Internal(format!(
                    "failed to read consent store file {}: {error}",
                    path.display()
                )))
            }
        };
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Writes the current map back to disk. Failures are logged rather than
    /// surfaced; a missed write leaves the previous document intact.
    fn persist(&self, data: &RwLockWriteGuard<'_, HashMap<String, Value>>) {
        let serialized = match serde_json::to_vec_pretty(&**data) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!("failed to serialize consent store: {error}");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                tracing::warn!(
                    "failed to create consent store directory {}: {error}",
                    parent.display()
                );
                return;
            }
        }
        if let Err(error) = std::fs::write(&self.path, serialized) {
            tracing::warn!(
                "failed to write consent store file {}: {error}",
                self.path.display()
            );
        }
    }
}

impl ConsentStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.insert(key.to_string(), value);
        self.persist(&data);
    }

    fn remove(&self, key: &str) -> bool {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let removed = data.remove(key).is_some();
        if removed {
            self.persist(&data);
        }
        removed
    }

    fn keys(&self) -> Vec<String> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
