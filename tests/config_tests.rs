// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;

use tempfile::TempDir;

use dojo::config::{BackendKind, Settings, DEFAULT_STORAGE_KEY};
use dojo::history::{DojoType, SessionHistory, SessionType, StartSession};
use dojo::storage::open_backend;

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.storage.backend, BackendKind::Filesystem);
    assert_eq!(settings.storage.key, DEFAULT_STORAGE_KEY);
    assert_eq!(settings.history.list_limit, 10);
    assert!(settings.history.retention_keep.is_none());
}

#[test]
fn test_settings_file_sections_are_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "storage": {"data_dir": "/var/lib/dojo", "key": "kana-history"},
            "history": {"list_limit": 5}
        }"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(
        settings.storage.data_dir,
        Some(std::path::PathBuf::from("/var/lib/dojo"))
    );
    assert_eq!(settings.storage.key, "kana-history");
    assert_eq!(settings.history.list_limit, 5);
}

#[test]
fn test_settings_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"storage": {"key": "../escape"}}"#).unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_settings_unknown_backend_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"storage": {"backend": "redis"}}"#).unwrap();

    assert!(Settings::load_from(&path).is_err());
}

#[tokio::test]
async fn test_configured_backend_and_key_are_used() {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.storage.data_dir = Some(dir.path().to_path_buf());
    settings.storage.key = "custom-history".to_string();

    let backend = open_backend(&settings).unwrap();
    let history = SessionHistory::new(backend).with_key(settings.storage.key.clone());
    history
        .start_session(StartSession::new(SessionType::Classic, DojoType::Kana, "pick"))
        .await
        .unwrap();

    assert!(dir.path().join("custom-history.json").exists());

    // Memory backends start empty every time
    settings.storage.backend = BackendKind::Memory;
    let history = Arc::new(SessionHistory::new(open_backend(&settings).unwrap()));
    assert!(history.active_drafts().await.is_empty());
}
