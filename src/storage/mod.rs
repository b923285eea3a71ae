// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Storage backends
//!
//! This module provides the key-value abstraction the session history
//! document is persisted through. Values are structured JSON documents,
//! stored and returned whole.

pub mod filesystem;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{BackendKind, Settings};
use crate::error::{DojoError, Result};

pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;

/// Asynchronous key-value storage for structured values
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get_item(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`
    async fn set_item(&self, key: &str, value: &Value) -> Result<()>;

    /// Remove the value stored under `key` (missing keys are not an error)
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Reject keys that cannot be mapped onto a single storage slot.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(DojoError::InvalidInput("storage key is empty".to_string()));
    }
    if key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(DojoError::InvalidInput(format!(
            "storage key '{}' must not contain path separators",
            key
        )));
    }
    Ok(())
}

/// Build the backend selected in `settings`.
pub fn open_backend(settings: &Settings) -> Result<Arc<dyn KeyValueStore>> {
    match settings.storage.backend {
        BackendKind::Filesystem => {
            let dir = settings.data_dir();
            tracing::debug!("Opening filesystem store at {:?}", dir);
            Ok(Arc::new(FilesystemStore::new(dir)))
        }
        BackendKind::Memory => {
            tracing::debug!("Opening in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
