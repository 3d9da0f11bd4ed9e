//! File-backed storage backend.
//!
//! All keys live in one JSON object at `<dir>/storage.json`, the same layout a
//! device key-value store keeps on disk:
//!
//! ```json
//! {"@GoMarketPlace:cart": "[{\"id\":\"1\",...}]"}
//! ```
//!
//! Writes go to a uniquely named temp file in the same directory that is then
//! renamed over the original, so a crash mid-write leaves the previous document
//! intact and two processes writing at once never share a temp file.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{KeyValueStore, Result, StorageError};

const STORAGE_FILE: &str = "storage.json";

/// Key-value store persisted to a directory on disk.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// Directory holding the storage document.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the storage document.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILE)
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(self.path()).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let contents = serde_json::to_vec_pretty(entries)?;
        let dir = self.dir.clone();
        let path = self.path();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
            temp.write_all(&contents)?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::Backend(format!("storage write task failed: {e}")))??;

        debug!(path = %self.path().display(), keys = entries.len(), "Wrote storage file");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_owned(), value);
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}
