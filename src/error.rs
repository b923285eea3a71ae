// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for Dojo
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Main error type for Dojo operations
#[derive(Error, Debug)]
pub enum DojoError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Session errors
    #[error("Session error: {0}")]
    Session(String),
}

/// Result type alias for Dojo operations
pub type Result<T> = std::result::Result<T, DojoError>;
