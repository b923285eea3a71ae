// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for Dojo
//!
//! Handles loading and saving settings from ~/.dojo/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod io;
mod validation;

/// Storage key of the session history document
pub const DEFAULT_STORAGE_KEY: &str = "dojo-session-history-v1";

/// Main settings structure, stored in ~/.dojo/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Where and how the history document is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// History display and retention settings
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Which key-value backend holds the document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file per key in the data directory
    #[default]
    Filesystem,
    /// Process-local, nothing survives exit. Each CLI invocation starts
    /// from an empty history with this backend.
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Backend implementation
    #[serde(default)]
    pub backend: BackendKind,

    /// Data directory for the filesystem backend (defaults to ~/.dojo/data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Key the history document is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: None,
            key: default_storage_key(),
        }
    }
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Default number of sessions shown by `history list`
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Number of finalized sessions kept by `history prune` (None = keep all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_keep: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
            retention_keep: None,
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_list_limit() -> usize {
    10
}
