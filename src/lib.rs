// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Dojo - session history for kana, kanji and vocabulary practice.
//!
//! This crate exposes the persistence layer used by:
//! - quiz front-ends, which start sessions, log attempts and finalize them
//! - the `dojo` CLI (`src/main.rs`), for inspecting and maintaining history
//!
//! Architecture highlights:
//! - `history`: the session history document and the service mutating it
//! - `storage`: key-value backends the document is persisted through
//! - `config`: user settings (backend, storage key, retention)

pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod storage;

pub use error::{DojoError, Result};
