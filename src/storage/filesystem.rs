// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Filesystem storage backend
//!
//! Stores each key as a single JSON file in a data directory. Writes land in
//! a sibling temp file, are flushed to disk, then renamed into place.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::{validate_key, KeyValueStore};
use crate::error::{DojoError, Result};

/// Filesystem-based key-value store
pub struct FilesystemStore {
    /// Directory holding one file per key
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Create a new filesystem store rooted at `base_path`
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the full path for a key
    fn item_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!(".{}.json.tmp", key))
    }
}

/// Write `bytes` to `path` and wait until they reach the disk.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for FilesystemStore {
    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        let path = self.item_path(key);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_str(&content).map_err(|e| {
            DojoError::Storage(format!("Failed to parse {:?}: {}", path, e))
        })?;

        Ok(Some(value))
    }

    async fn set_item(&self, key: &str, value: &Value) -> Result<()> {
        validate_key(key)?;
        tokio::fs::create_dir_all(&self.base_path).await?;

        let content = serde_json::to_string_pretty(value)?;
        let tmp = self.temp_path(key);

        if let Err(e) = write_synced(&tmp, content.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, self.item_path(key)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::trace!("Wrote {:?}", self.item_path(key));
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        match tokio::fs::remove_file(self.item_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_filesystem_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());

        let value = json!({"version": 1, "sessionOrder": ["a", "b"]});
        store.set_item("history", &value).await.unwrap();

        let read = store.get_item("history").await.unwrap().unwrap();
        assert_eq!(read, value);
    }

    #[tokio::test]
    async fn test_filesystem_store_missing_key() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());

        assert!(store.get_item("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filesystem_store_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FilesystemStore::new(nested.clone());

        store.set_item("k", &json!(true)).await.unwrap();
        assert!(nested.join("k.json").exists());
    }

    #[tokio::test]
    async fn test_filesystem_store_overwrites() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());

        store.set_item("k", &json!({"n": 1})).await.unwrap();
        store.set_item("k", &json!({"n": 2})).await.unwrap();

        assert_eq!(store.get_item("k").await.unwrap(), Some(json!({"n": 2})));
        assert!(!dir.path().join(".k.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_filesystem_store_replaces_stale_temp_file() {
        let dir = tempdir().unwrap();
        // Left behind by a write that never reached the rename
        std::fs::write(dir.path().join(".k.json.tmp"), "{ half").unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());

        store.set_item("k", &json!({"n": 3})).await.unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("k.json")).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&on_disk).unwrap(),
            json!({"n": 3})
        );
        assert!(!dir.path().join(".k.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_synced_writes_full_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_synced(&path, b"{\"version\":1}").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"version\":1}");
    }

    #[tokio::test]
    async fn test_filesystem_store_corrupt_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("k.json"), "{ not json").unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());

        let result = store.get_item("k").await;
        assert!(matches!(result, Err(DojoError::Storage(_))));
    }

    #[tokio::test]
    async fn test_filesystem_store_remove() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());

        store.set_item("k", &json!(1)).await.unwrap();
        store.remove_item("k").await.unwrap();
        assert!(store.get_item("k").await.unwrap().is_none());

        // Removing again is fine
        store.remove_item("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_filesystem_store_rejects_bad_key() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().to_path_buf());

        let result = store.set_item("../outside", &json!(1)).await;
        assert!(matches!(result, Err(DojoError::InvalidInput(_))));
    }
}
