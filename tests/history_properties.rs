// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Property tests for the session lifecycle
//!
//! - start, N appends, finalize yields N attempts with idx == position
//! - duration is never negative, whatever the clock does
//! - appends to unknown ids never change the stored document

use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use dojo::config::DEFAULT_STORAGE_KEY;
use dojo::history::{
    AttemptInput, DojoType, EndedReason, FinalizeSession, InputKind, ManualClock, SessionHistory,
    SessionType, StartSession,
};
use dojo::storage::{KeyValueStore, MemoryStore};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn arb_session_type() -> impl Strategy<Value = SessionType> {
    prop_oneof![
        Just(SessionType::Classic),
        Just(SessionType::Blitz),
        Just(SessionType::Gauntlet),
    ]
}

fn arb_input_kind() -> impl Strategy<Value = InputKind> {
    prop_oneof![
        Just(InputKind::Pick),
        Just(InputKind::Type),
        Just(InputKind::WordBuilding),
    ]
}

fn arb_attempt() -> impl Strategy<Value = AttemptInput> {
    ("[a-z]{1,6}", arb_input_kind(), any::<bool>(), proptest::option::of(0u64..60_000)).prop_map(
        |(answer, kind, correct, time)| {
            let attempt = AttemptInput::new(
                format!("q-{}", answer),
                answer.clone(),
                vec![answer.clone()],
                answer,
                kind,
                correct,
            );
            match time {
                Some(ms) => attempt.with_time_taken(ms),
                None => attempt,
            }
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_attempt_indices_match_positions(
        session_type in arb_session_type(),
        attempts in proptest::collection::vec(arb_attempt(), 0..25),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let history = SessionHistory::new(Arc::new(MemoryStore::new()));
            let id = history
                .start_session(StartSession::new(session_type, DojoType::Kana, "pick"))
                .await
                .unwrap();

            let n = attempts.len();
            let correct = attempts.iter().filter(|a| a.is_correct).count() as u32;
            for attempt in attempts {
                history.append_attempt(&id, attempt).await.unwrap();
            }

            let record = history
                .finalize_session(
                    FinalizeSession::new(&id, EndedReason::Completed)
                        .with_score(correct, n as u32 - correct, 0),
                )
                .await
                .unwrap()
                .unwrap();

            prop_assert_eq!(record.attempts.len(), n);
            prop_assert_eq!(record.summary.total_attempts as usize, n);
            for (i, event) in record.attempts.iter().enumerate() {
                prop_assert_eq!(event.idx as usize, i);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_duration_never_negative(
        start in -1_000_000i64..1_000_000,
        delta in -500_000i64..500_000,
    ) {
        let rt = runtime();
        rt.block_on(async {
            let clock = ManualClock::new(start);
            let history = SessionHistory::new(Arc::new(MemoryStore::new()))
                .with_clock(Arc::new(clock.clone()));
            let id = history
                .start_session(StartSession::new(SessionType::Classic, DojoType::Kanji, "type"))
                .await
                .unwrap();

            clock.advance(delta);
            let record = history
                .finalize_session(FinalizeSession::new(&id, EndedReason::ManualQuit))
                .await
                .unwrap()
                .unwrap();

            prop_assert_eq!(record.duration_ms, delta.max(0) as u64);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_unknown_append_is_noop(attempt in arb_attempt(), suffix in "[a-z0-9]{7}") {
        let rt = runtime();
        rt.block_on(async {
            let backend = Arc::new(MemoryStore::new());
            let history = SessionHistory::new(backend.clone());
            history
                .start_session(StartSession::new(SessionType::Blitz, DojoType::Vocabulary, "pick"))
                .await
                .unwrap();
            let before = backend.get_item(DEFAULT_STORAGE_KEY).await.unwrap();

            let unknown = format!("gauntlet-0-{}", suffix);
            let idx = history.append_attempt(&unknown, attempt).await.unwrap();

            prop_assert_eq!(idx, None);
            prop_assert_eq!(backend.get_item(DEFAULT_STORAGE_KEY).await.unwrap(), before);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
