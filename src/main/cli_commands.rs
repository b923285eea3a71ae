// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;

use dojo::cli::{
    AttemptArgs, FinalizeArgs, HistoryArgs, HistoryCommands, OutputFormat, SessionArgs,
    SessionCommands,
};
use dojo::config::Settings;
use dojo::error::{DojoError, Result};
use dojo::history::clock::to_datetime;
use dojo::history::id::parse_session_id;
use dojo::history::payload::parse_payload_entry;
use dojo::history::{
    AttemptInput, FinalizeSession, PayloadMap, SessionDraft, SessionHistory, SessionRecord,
    StartSession,
};

fn parse_payload(entries: &[String]) -> Result<PayloadMap> {
    entries
        .iter()
        .map(|entry| parse_payload_entry(entry))
        .collect()
}

/// Reject strings that cannot be session ids before touching storage.
fn check_session_id(session_id: &str) -> Result<()> {
    if parse_session_id(session_id).is_none() {
        return Err(DojoError::InvalidInput(format!(
            "'{}' is not a session id (expected <type>-<millis>-<suffix>)",
            session_id
        )));
    }
    Ok(())
}

fn format_timestamp(millis: i64) -> String {
    to_datetime(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

fn format_record_line(record: &SessionRecord) -> String {
    format!(
        "  {} | {} | {}/{}/{} | {:>3.0}% | {} | {}",
        record.id,
        format_timestamp(record.started_at),
        record.session_type,
        record.dojo_type,
        record.game_mode,
        record.summary.accuracy * 100.0,
        format_duration(record.duration_ms),
        record.ended_reason,
    )
}

fn format_draft_line(draft: &SessionDraft) -> String {
    format!(
        "  {} | {} | {}/{}/{} | {} attempt(s)",
        draft.id,
        format_timestamp(draft.started_at),
        draft.session_type,
        draft.dojo_type,
        draft.game_mode,
        draft.attempts.len(),
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn attempt_from_args(args: AttemptArgs) -> Result<(String, AttemptInput)> {
    let mut attempt = AttemptInput::new(
        args.question_id,
        args.prompt,
        args.expected,
        args.answer,
        args.kind,
        args.correct,
    );
    if let Some(ms) = args.time_ms {
        attempt = attempt.with_time_taken(ms);
    }
    if !args.extra.is_empty() {
        attempt = attempt.with_extra(parse_payload(&args.extra)?);
    }
    Ok((args.session_id, attempt))
}

fn finalize_from_args(args: FinalizeArgs) -> Result<FinalizeSession> {
    let mut params = FinalizeSession::new(args.session_id, args.reason)
        .abrupt(args.abrupt)
        .with_score(args.correct, args.wrong, args.best_streak);
    if let Some(stars) = args.stars {
        params = params.with_stars(stars);
    }
    if !args.payload.is_empty() {
        params = params.with_mode_payload(parse_payload(&args.payload)?);
    }
    Ok(params)
}

/// Run session subcommands
pub(super) async fn run_session_command(
    args: SessionArgs,
    history: &Arc<SessionHistory>,
    format: &OutputFormat,
) -> Result<()> {
    match args.command {
        SessionCommands::Start {
            session_type,
            dojo,
            mode,
            sets,
            count,
            route,
        } => {
            let params = StartSession::new(session_type, dojo, mode)
                .with_selection(sets, count)
                .with_route(route);
            let id = history.start_session(params).await?;

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "id": id }))?,
                OutputFormat::Text => println!("{}", id),
            }
        }

        SessionCommands::Attempt(args) => {
            let (session_id, attempt) = attempt_from_args(args)?;
            let idx = history.append_attempt(&session_id, attempt).await?;

            match (format, idx) {
                (OutputFormat::Json, idx) => print_json(&serde_json::json!({ "idx": idx }))?,
                (OutputFormat::Text, Some(idx)) => println!("Recorded attempt #{}.", idx),
                (OutputFormat::Text, None) => {
                    println!("No active session '{}'; attempt not recorded.", session_id)
                }
            }
        }

        SessionCommands::Finalize(args) => {
            let params = finalize_from_args(args)?;
            let session_id = params.session_id.clone();
            let record = history.finalize_session(params).await?;

            match (format, record) {
                (OutputFormat::Json, record) => print_json(&record)?,
                (OutputFormat::Text, Some(record)) => {
                    println!("\nFinalized session:\n");
                    println!("{}", format_record_line(&record));
                    println!();
                }
                (OutputFormat::Text, None) => {
                    println!("No active session '{}'; nothing finalized.", session_id)
                }
            }
        }

        SessionCommands::Discard { session_id } => {
            check_session_id(&session_id)?;
            let discarded = history.discard_draft(&session_id).await?;

            match format {
                OutputFormat::Json => {
                    print_json(&serde_json::json!({ "discarded": discarded }))?
                }
                OutputFormat::Text if discarded => println!("Session discarded."),
                OutputFormat::Text => println!("Session not found."),
            }
        }
    }

    Ok(())
}

/// Run history subcommands
pub(super) async fn run_history_command(
    args: HistoryArgs,
    history: &Arc<SessionHistory>,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    match args.command {
        HistoryCommands::List { limit } => {
            let limit = limit.unwrap_or(settings.history.list_limit);
            let sessions = history.recent_sessions(limit).await;

            if *format == OutputFormat::Json {
                return print_json(&sessions);
            }

            if sessions.is_empty() {
                println!("\nNo sessions in history.\n");
                return Ok(());
            }

            println!("\nRecent sessions:\n");
            for record in &sessions {
                println!("{}", format_record_line(record));
            }
            println!();
        }

        HistoryCommands::Show { session_id } => {
            check_session_id(&session_id)?;
            let record = history.session(&session_id).await.ok_or_else(|| {
                DojoError::Session(format!("session '{}' not found", session_id))
            })?;

            if *format == OutputFormat::Json {
                return print_json(&record);
            }

            println!("\nSession: {}", record.id);
            println!("Type: {} / {} / {}", record.session_type, record.dojo_type, record.game_mode);
            println!("Started: {}", format_timestamp(record.started_at));
            println!(
                "Ended: {} ({}{})",
                format_timestamp(record.ended_at),
                record.ended_reason,
                if record.ended_abruptly { ", abruptly" } else { "" }
            );
            println!("Duration: {}", format_duration(record.duration_ms));
            if !record.selection_context.selected_sets.is_empty() {
                println!(
                    "Sets: {} ({} items)",
                    record.selection_context.selected_sets.join(", "),
                    record.selection_context.selected_count
                );
            }
            println!(
                "Score: {} correct, {} wrong ({:.0}%), best streak {}, {} star(s)",
                record.summary.correct,
                record.summary.wrong,
                record.summary.accuracy * 100.0,
                record.summary.best_streak,
                record.summary.stars
            );
            for (key, value) in &record.mode_payload {
                println!("  {}: {}", key, value);
            }

            println!("\nAttempts ({}):", record.summary.total_attempts);
            for event in &record.attempts {
                let a = &event.attempt;
                println!(
                    "  #{:<3} {} {} -> {} ({})",
                    event.idx,
                    if a.is_correct { "✓" } else { "✗" },
                    a.question_prompt,
                    a.user_answer,
                    a.expected_answers.join(" / ")
                );
            }
            println!();
        }

        HistoryCommands::Active => {
            let drafts = history.active_drafts().await;

            if *format == OutputFormat::Json {
                return print_json(&drafts);
            }

            if drafts.is_empty() {
                println!("\nNo active sessions.\n");
                return Ok(());
            }

            println!("\nActive sessions:\n");
            for draft in &drafts {
                println!("{}", format_draft_line(draft));
            }
            println!();
        }

        HistoryCommands::Prune { keep } => {
            let Some(keep) = settings.effective_retention(keep) else {
                println!("No retention configured; pass --keep or set history.retention_keep.");
                return Ok(());
            };

            let removed = history.prune(keep).await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "removed": removed }))?,
                OutputFormat::Text => println!("Pruned {} session(s) from history.", removed),
            }
        }

        HistoryCommands::Clear { force } => {
            if !force {
                println!("This will delete ALL session history.");
                println!("Run with --force to confirm.");
                return Ok(());
            }

            history.clear().await?;
            println!("Cleared session history.");
        }
    }

    Ok(())
}
