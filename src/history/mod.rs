// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session history for practice runs
//!
//! Records drafts of sessions in progress, the attempts logged into them,
//! and the immutable records produced when they are finalized.

pub mod clock;
pub mod id;
pub mod model;
pub mod payload;
pub mod store;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use model::{
    AttemptEvent, AttemptInput, DojoType, EndedReason, InputKind, SelectionContext, SessionDraft,
    SessionHistoryStore, SessionRecord, SessionSummary, SessionType, STORE_VERSION,
};
pub use payload::{PayloadMap, PayloadValue};
pub use store::{FinalizeSession, SessionHistory, StartSession};
pub use tracker::ActiveSessionTracker;
