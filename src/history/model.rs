// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session history document model
//!
//! Everything here is persisted as part of one JSON document with camelCase
//! field names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::payload::{validate_payload, PayloadMap};
use crate::error::DojoError;

/// Schema version of the persisted document
pub const STORE_VERSION: u32 = 1;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire name of this variant
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DojoError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(DojoError::InvalidInput(format!(
                        "unknown {} '{}' (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

/// Kind of practice run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Classic,
    Blitz,
    Gauntlet,
}

string_enum!(SessionType {
    Classic => "classic",
    Blitz => "blitz",
    Gauntlet => "gauntlet",
});

/// Content domain being practiced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DojoType {
    Kana,
    Kanji,
    Vocabulary,
}

string_enum!(DojoType {
    Kana => "kana",
    Kanji => "kanji",
    Vocabulary => "vocabulary",
});

/// How an answer was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Pick,
    Type,
    WordBuilding,
}

string_enum!(InputKind {
    Pick => "pick",
    Type => "type",
    WordBuilding => "word_building",
});

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndedReason {
    /// Ran to its natural end
    Completed,
    /// Lost (out of lives, time up without passing)
    Failed,
    /// Player quit from the game UI
    ManualQuit,
    /// Player navigated away mid-session
    NavigationExit,
    /// Page or app was closed mid-session
    UnloadExit,
}

string_enum!(EndedReason {
    Completed => "completed",
    Failed => "failed",
    ManualQuit => "manual_quit",
    NavigationExit => "navigation_exit",
    UnloadExit => "unload_exit",
});

/// Which content the player picked before starting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    pub selected_sets: Vec<String>,
    pub selected_count: u32,
    pub route: String,
}

/// One answer submission, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptInput {
    pub question_id: String,
    pub question_prompt: String,
    pub expected_answers: Vec<String>,
    pub user_answer: String,
    pub input_kind: InputKind,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_shown: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrong_selections_before_correct: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak_before: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak_after: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_before: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_after: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lives_before: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lives_after: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<PayloadMap>,
}

impl AttemptInput {
    /// Create an attempt with only the required fields set
    pub fn new(
        question_id: impl Into<String>,
        question_prompt: impl Into<String>,
        expected_answers: Vec<String>,
        user_answer: impl Into<String>,
        input_kind: InputKind,
        is_correct: bool,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            question_prompt: question_prompt.into(),
            expected_answers,
            user_answer: user_answer.into(),
            input_kind,
            is_correct,
            time_taken_ms: None,
            options_shown: None,
            wrong_selections_before_correct: None,
            streak_before: None,
            streak_after: None,
            score_before: None,
            score_after: None,
            lives_before: None,
            lives_after: None,
            extra: None,
        }
    }

    pub fn with_time_taken(mut self, ms: u64) -> Self {
        self.time_taken_ms = Some(ms);
        self
    }

    pub fn with_options_shown(mut self, options: Vec<String>) -> Self {
        self.options_shown = Some(options);
        self
    }

    pub fn with_wrong_selections(mut self, wrong: Vec<String>) -> Self {
        self.wrong_selections_before_correct = Some(wrong);
        self
    }

    pub fn with_streak(mut self, before: u32, after: u32) -> Self {
        self.streak_before = Some(before);
        self.streak_after = Some(after);
        self
    }

    pub fn with_score(mut self, before: i64, after: i64) -> Self {
        self.score_before = Some(before);
        self.score_after = Some(after);
        self
    }

    pub fn with_lives(mut self, before: u32, after: u32) -> Self {
        self.lives_before = Some(before);
        self.lives_after = Some(after);
        self
    }

    pub fn with_extra(mut self, extra: PayloadMap) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Reject an `extra` payload that JSON cannot represent
    pub fn validate(&self) -> Result<(), DojoError> {
        match &self.extra {
            Some(extra) => validate_payload(extra),
            None => Ok(()),
        }
    }
}

/// A recorded answer submission within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptEvent {
    /// Position within the session, starting at 0
    pub idx: u32,
    /// When the attempt was recorded (epoch ms)
    pub ts: i64,
    #[serde(flatten)]
    pub attempt: AttemptInput,
}

impl AttemptEvent {
    pub fn new(idx: u32, ts: i64, attempt: AttemptInput) -> Self {
        Self { idx, ts, attempt }
    }
}

/// A session still being played
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub id: String,
    pub session_type: SessionType,
    pub dojo_type: DojoType,
    pub game_mode: String,
    pub started_at: i64,
    pub selection_context: SelectionContext,
    pub attempts: Vec<AttemptEvent>,
}

impl SessionDraft {
    /// Number of recorded attempts
    pub fn attempt_count(&self) -> Result<u32, DojoError> {
        attempt_count(&self.id, self.attempts.len())
    }

    /// Index the next appended attempt will receive
    pub fn next_idx(&self) -> Result<u32, DojoError> {
        self.attempt_count()
    }
}

fn attempt_count(session_id: &str, len: usize) -> Result<u32, DojoError> {
    u32::try_from(len).map_err(|_| {
        DojoError::Session(format!(
            "session {} has more than {} attempts",
            session_id,
            u32::MAX
        ))
    })
}

/// Derived totals of a finalized session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub correct: u32,
    pub wrong: u32,
    /// correct / (correct + wrong), 0 when nothing was answered
    pub accuracy: f64,
    pub best_streak: u32,
    pub stars: u32,
    pub total_attempts: u32,
}

impl SessionSummary {
    pub fn new(
        correct: u32,
        wrong: u32,
        best_streak: u32,
        stars: u32,
        total_attempts: u32,
    ) -> Self {
        let total = u64::from(correct) + u64::from(wrong);
        let accuracy = if total > 0 {
            f64::from(correct) / total as f64
        } else {
            0.0
        };

        Self {
            correct,
            wrong,
            accuracy,
            best_streak,
            stars,
            total_attempts,
        }
    }
}

/// A finalized, immutable session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub session_type: SessionType,
    pub dojo_type: DojoType,
    pub game_mode: String,
    pub started_at: i64,
    pub ended_at: i64,
    pub duration_ms: u64,
    pub ended_reason: EndedReason,
    pub ended_abruptly: bool,
    pub selection_context: SelectionContext,
    pub summary: SessionSummary,
    pub attempts: Vec<AttemptEvent>,
    #[serde(default)]
    pub mode_payload: PayloadMap,
}

/// The persisted root document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryStore {
    pub version: u32,
    pub created_at: i64,
    pub updated_at: i64,
    pub total_sessions: u64,
    pub sessions_by_id: BTreeMap<String, SessionRecord>,
    /// Finalized ids, most recent first
    pub session_order: Vec<String>,
    pub active_sessions_by_id: BTreeMap<String, SessionDraft>,
}

impl SessionHistoryStore {
    /// An empty store stamped with `now`
    pub fn new(now: i64) -> Self {
        Self {
            version: STORE_VERSION,
            created_at: now,
            updated_at: now,
            total_sessions: 0,
            sessions_by_id: BTreeMap::new(),
            session_order: Vec::new(),
            active_sessions_by_id: BTreeMap::new(),
        }
    }

    /// Whether `id` is taken by a draft or a finalized session
    pub fn contains_id(&self, id: &str) -> bool {
        self.sessions_by_id.contains_key(id) || self.active_sessions_by_id.contains_key(id)
    }

    /// Finalized sessions, most recent first
    pub fn sessions_in_order(&self) -> impl Iterator<Item = &SessionRecord> {
        self.session_order
            .iter()
            .filter_map(|id| self.sessions_by_id.get(id))
    }

    /// Check that every payload in the document is representable as JSON.
    pub fn validate_payloads(&self) -> Result<(), DojoError> {
        for record in self.sessions_by_id.values() {
            validate_payload(&record.mode_payload)?;
            for event in &record.attempts {
                event.attempt.validate()?;
            }
        }
        for draft in self.active_sessions_by_id.values() {
            for event in &draft.attempts {
                event.attempt.validate()?;
            }
        }
        Ok(())
    }

    /// Check the structural invariants of the document.
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.session_order.len() != self.sessions_by_id.len() {
            return Err(format!(
                "sessionOrder has {} ids but sessionsById has {} records",
                self.session_order.len(),
                self.sessions_by_id.len()
            ));
        }
        for id in &self.session_order {
            if !self.sessions_by_id.contains_key(id) {
                return Err(format!("sessionOrder references missing session {}", id));
            }
        }
        for id in self.active_sessions_by_id.keys() {
            if self.sessions_by_id.contains_key(id) {
                return Err(format!("session {} is both active and finalized", id));
            }
        }
        for draft in self.active_sessions_by_id.values() {
            for (pos, attempt) in draft.attempts.iter().enumerate() {
                if attempt.idx as usize != pos {
                    return Err(format!(
                        "draft {} has attempt idx {} at position {}",
                        draft.id, attempt.idx, pos
                    ));
                }
            }
        }
        Ok(())
    }
}
