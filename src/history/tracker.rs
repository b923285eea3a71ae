// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Active session pointer for game screens
//!
//! Game screens answer questions without knowing which session they belong to;
//! the tracker remembers the current session id and routes attempts to it.

use std::sync::{Arc, Mutex};

use super::model::AttemptInput;
use super::store::SessionHistory;
use crate::error::Result;

/// Routes attempts to whichever session is currently active
pub struct ActiveSessionTracker {
    history: Arc<SessionHistory>,
    active: Mutex<Option<String>>,
}

impl ActiveSessionTracker {
    pub fn new(history: Arc<SessionHistory>) -> Self {
        Self {
            history,
            active: Mutex::new(None),
        }
    }

    /// Set (or clear, with `None`) the active session id
    pub fn set_active(&self, session_id: Option<String>) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        *active = session_id;
    }

    /// Currently active session id
    pub fn active(&self) -> Option<String> {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Record an attempt against the active session. Without an active
    /// session nothing is written and `None` is returned.
    pub async fn log_attempt(&self, attempt: AttemptInput) -> Result<Option<u32>> {
        let Some(session_id) = self.active() else {
            tracing::debug!("No active session, attempt not logged");
            return Ok(None);
        };
        self.history.append_attempt(&session_id, attempt).await
    }
}
