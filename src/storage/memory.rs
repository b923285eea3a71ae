// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! In-memory storage backend
//!
//! Nothing is persisted: each process starts from an empty store. Useful for
//! tests and for embedding the history in a host that owns persistence.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{validate_key, KeyValueStore};
use crate::error::Result;

/// Process-local key-value store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &Value) -> Result<()> {
        validate_key(key)?;
        self.items
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.items.write().await.remove(key);
        Ok(())
    }
}
