// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{DojoError, Result};
use crate::storage::validate_key;

use super::Settings;

impl Settings {
    /// Check that the settings describe a usable configuration.
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.storage.key)
            .map_err(|e| DojoError::Config(format!("storage.key: {}", e)))?;

        if self.history.list_limit == 0 {
            return Err(DojoError::Config(
                "history.list_limit must be at least 1".to_string(),
            ));
        }

        if self.history.retention_keep == Some(0) {
            return Err(DojoError::Config(
                "history.retention_keep must be at least 1 (omit it to keep everything)"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve how many sessions a prune should keep: explicit value first,
    /// then the configured retention.
    pub fn effective_retention(&self, explicit: Option<usize>) -> Option<usize> {
        explicit.or(self.history.retention_keep)
    }
}
