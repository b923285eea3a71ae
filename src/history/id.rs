// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session id generation
//!
//! Ids look like `classic-1718000000000-k3x9q2a`: session type, epoch
//! milliseconds at creation, then a random base-36 suffix.

use rand::Rng;

use super::model::SessionType;

/// Length of the random suffix
pub const SUFFIX_LEN: usize = 7;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a new session id.
pub fn generate_session_id(session_type: SessionType, now_millis: i64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}-{}", session_type.as_str(), now_millis, suffix)
}

/// Split an id back into its session type, timestamp and suffix.
pub fn parse_session_id(id: &str) -> Option<(SessionType, i64, &str)> {
    let mut parts = id.splitn(3, '-');
    let session_type = parts.next()?.parse().ok()?;
    let millis = parts.next()?.parse().ok()?;
    let suffix = parts.next()?;
    if suffix.is_empty() {
        return None;
    }
    Some((session_type, millis, suffix))
}
