// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session history service
//!
//! The whole history lives in one JSON document under a single storage key.
//! Every mutation is a load, modify, save of that document, performed while
//! holding the service's write lock so that concurrent callers in this process
//! never overwrite each other's changes.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::clock::{Clock, SystemClock};
use super::id::generate_session_id;
use super::model::{
    AttemptEvent, AttemptInput, DojoType, EndedReason, SelectionContext, SessionDraft,
    SessionHistoryStore, SessionRecord, SessionSummary, SessionType, STORE_VERSION,
};
use super::payload::{validate_payload, PayloadMap};
use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::Result;
use crate::storage::KeyValueStore;

/// Parameters for starting a session
#[derive(Debug, Clone, PartialEq)]
pub struct StartSession {
    pub session_type: SessionType,
    pub dojo_type: DojoType,
    pub game_mode: String,
    pub selected_sets: Vec<String>,
    pub selected_count: u32,
    pub route: String,
}

impl StartSession {
    /// Start parameters with an empty selection context
    pub fn new(
        session_type: SessionType,
        dojo_type: DojoType,
        game_mode: impl Into<String>,
    ) -> Self {
        Self {
            session_type,
            dojo_type,
            game_mode: game_mode.into(),
            selected_sets: Vec::new(),
            selected_count: 0,
            route: String::new(),
        }
    }

    pub fn with_selection(mut self, sets: Vec<String>, count: u32) -> Self {
        self.selected_sets = sets;
        self.selected_count = count;
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }
}

/// Parameters for finalizing a session
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeSession {
    pub session_id: String,
    pub ended_reason: EndedReason,
    pub ended_abruptly: bool,
    pub correct: u32,
    pub wrong: u32,
    pub best_streak: u32,
    pub stars: Option<u32>,
    pub mode_payload: Option<PayloadMap>,
}

impl FinalizeSession {
    pub fn new(session_id: impl Into<String>, ended_reason: EndedReason) -> Self {
        Self {
            session_id: session_id.into(),
            ended_reason,
            ended_abruptly: false,
            correct: 0,
            wrong: 0,
            best_streak: 0,
            stars: None,
            mode_payload: None,
        }
    }

    pub fn abrupt(mut self, ended_abruptly: bool) -> Self {
        self.ended_abruptly = ended_abruptly;
        self
    }

    pub fn with_score(mut self, correct: u32, wrong: u32, best_streak: u32) -> Self {
        self.correct = correct;
        self.wrong = wrong;
        self.best_streak = best_streak;
        self
    }

    pub fn with_stars(mut self, stars: u32) -> Self {
        self.stars = Some(stars);
        self
    }

    pub fn with_mode_payload(mut self, payload: PayloadMap) -> Self {
        self.mode_payload = Some(payload);
        self
    }
}

/// Versioned store of session drafts and finalized sessions
pub struct SessionHistory {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    clock: Arc<dyn Clock>,
    /// Serializes load-modify-save cycles
    write_lock: Mutex<()>,
}

impl SessionHistory {
    /// Create a history over `backend` using the default key and system clock
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            key: DEFAULT_STORAGE_KEY.to_string(),
            clock: Arc::new(SystemClock),
            write_lock: Mutex::new(()),
        }
    }

    /// Use a different storage key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Use a different clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Storage key of the document
    pub fn key(&self) -> &str {
        &self.key
    }

    fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Load the document. Missing, unreadable, or wrong-version documents
    /// yield a fresh empty store; this never fails.
    pub async fn load_store(&self) -> SessionHistoryStore {
        let raw = match self.backend.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return SessionHistoryStore::new(self.now()),
            Err(e) => {
                tracing::warn!("Failed to read session history, starting empty: {}", e);
                return SessionHistoryStore::new(self.now());
            }
        };

        let version = raw.get("version").and_then(|v| v.as_u64());
        if version != Some(u64::from(STORE_VERSION)) {
            tracing::warn!(
                "Session history version {:?} does not match {}, starting empty",
                version,
                STORE_VERSION
            );
            return SessionHistoryStore::new(self.now());
        }

        match serde_json::from_value(raw) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Failed to decode session history, starting empty: {}", e);
                SessionHistoryStore::new(self.now())
            }
        }
    }

    /// Overwrite the document with `store`. Fails without writing when a
    /// payload holds a number JSON cannot represent.
    pub async fn save_store(&self, store: &SessionHistoryStore) -> Result<()> {
        store.validate_payloads()?;
        let value = serde_json::to_value(store)?;
        self.backend.set_item(&self.key, &value).await
    }

    /// Create a draft and return its id.
    pub async fn start_session(&self, params: StartSession) -> Result<String> {
        let _guard = self.write_lock.lock().await;
        let mut store = self.load_store().await;

        let now = self.now();
        let mut id = generate_session_id(params.session_type, now);
        while store.contains_id(&id) {
            id = generate_session_id(params.session_type, now);
        }

        let draft = SessionDraft {
            id: id.clone(),
            session_type: params.session_type,
            dojo_type: params.dojo_type,
            game_mode: params.game_mode,
            started_at: now,
            selection_context: SelectionContext {
                selected_sets: params.selected_sets,
                selected_count: params.selected_count,
                route: params.route,
            },
            attempts: Vec::new(),
        };

        store.active_sessions_by_id.insert(id.clone(), draft);
        store.updated_at = self.now();
        self.save_store(&store).await?;

        tracing::debug!("Started session {}", id);
        Ok(id)
    }

    /// Append an attempt to a draft. Returns the attempt's index, or `None`
    /// (writing nothing) when no draft has this id. An `extra` payload with
    /// non-finite numbers is rejected as invalid input.
    pub async fn append_attempt(
        &self,
        session_id: &str,
        attempt: AttemptInput,
    ) -> Result<Option<u32>> {
        attempt.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut store = self.load_store().await;

        let ts = self.now();
        let Some(draft) = store.active_sessions_by_id.get_mut(session_id) else {
            tracing::debug!("Dropping attempt for unknown session {}", session_id);
            return Ok(None);
        };

        let idx = draft.next_idx()?;
        draft.attempts.push(AttemptEvent::new(idx, ts, attempt));
        store.updated_at = self.now();
        self.save_store(&store).await?;

        Ok(Some(idx))
    }

    /// Close a draft into an immutable record. Returns `None` (writing
    /// nothing) when no draft has this id. A mode payload with non-finite
    /// numbers is rejected and the draft stays active.
    pub async fn finalize_session(&self, params: FinalizeSession) -> Result<Option<SessionRecord>> {
        if let Some(payload) = &params.mode_payload {
            validate_payload(payload)?;
        }

        let _guard = self.write_lock.lock().await;
        let mut store = self.load_store().await;

        let Some(draft) = store.active_sessions_by_id.remove(&params.session_id) else {
            tracing::debug!("Ignoring finalize for unknown session {}", params.session_id);
            return Ok(None);
        };

        let ended_at = self.now();
        let duration_ms = u64::try_from(ended_at.saturating_sub(draft.started_at)).unwrap_or(0);
        let summary = SessionSummary::new(
            params.correct,
            params.wrong,
            params.best_streak,
            params.stars.unwrap_or(0),
            draft.attempt_count()?,
        );

        let record = SessionRecord {
            id: draft.id,
            session_type: draft.session_type,
            dojo_type: draft.dojo_type,
            game_mode: draft.game_mode,
            started_at: draft.started_at,
            ended_at,
            duration_ms,
            ended_reason: params.ended_reason,
            ended_abruptly: params.ended_abruptly,
            selection_context: draft.selection_context,
            summary,
            attempts: draft.attempts,
            mode_payload: params.mode_payload.unwrap_or_default(),
        };

        store
            .sessions_by_id
            .insert(record.id.clone(), record.clone());
        store.session_order.insert(0, record.id.clone());
        store.total_sessions += 1;
        store.updated_at = self.now();
        self.save_store(&store).await?;

        tracing::debug!(
            "Finalized session {} ({}, {} attempts)",
            record.id,
            record.ended_reason,
            record.summary.total_attempts
        );
        Ok(Some(record))
    }

    /// Look up a finalized session.
    pub async fn session(&self, session_id: &str) -> Option<SessionRecord> {
        self.load_store().await.sessions_by_id.remove(session_id)
    }

    /// Up to `limit` finalized sessions, most recent first.
    pub async fn recent_sessions(&self, limit: usize) -> Vec<SessionRecord> {
        self.load_store()
            .await
            .sessions_in_order()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Drafts that have not been finalized, oldest first.
    pub async fn active_drafts(&self) -> Vec<SessionDraft> {
        let mut drafts: Vec<_> = self
            .load_store()
            .await
            .active_sessions_by_id
            .into_values()
            .collect();
        drafts.sort_by(|a, b| a.started_at.cmp(&b.started_at).then_with(|| a.id.cmp(&b.id)));
        drafts
    }

    /// Drop a draft without recording it. Returns whether it existed.
    pub async fn discard_draft(&self, session_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut store = self.load_store().await;

        if store.active_sessions_by_id.remove(session_id).is_none() {
            return Ok(false);
        }

        store.updated_at = self.now();
        self.save_store(&store).await?;
        tracing::debug!("Discarded draft {}", session_id);
        Ok(true)
    }

    /// Keep only the `keep` most recent finalized sessions. Returns how many
    /// were removed. `totalSessions` counts lifetime sessions and is untouched.
    pub async fn prune(&self, keep: usize) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut store = self.load_store().await;

        if store.session_order.len() <= keep {
            return Ok(0);
        }

        let removed_ids = store.session_order.split_off(keep);
        for id in &removed_ids {
            store.sessions_by_id.remove(id);
        }

        store.updated_at = self.now();
        self.save_store(&store).await?;

        tracing::debug!("Pruned {} session(s), kept {}", removed_ids.len(), keep);
        Ok(removed_ids.len())
    }

    /// Remove the whole document.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.backend.remove_item(&self.key).await
    }
}
