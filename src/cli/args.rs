// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for Dojo.

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::history::{DojoType, EndedReason, InputKind, SessionType};

/// Dojo - practice session history for kana, kanji and vocabulary drills
#[derive(Parser, Debug)]
#[command(name = "dojo")]
#[command(version, about = "Practice session history for kana, kanji and vocabulary drills")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record session activity
    Session(SessionArgs),

    /// Browse and maintain session history
    History(HistoryArgs),
}

/// Arguments for the session subcommand
#[derive(clap::Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

/// Session subcommands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Start a new session and print its id
    Start {
        /// Session type (classic, blitz, gauntlet)
        #[arg(short = 't', long = "type")]
        session_type: SessionType,

        /// Content domain (kana, kanji, vocabulary)
        #[arg(short, long)]
        dojo: DojoType,

        /// Game mode label
        #[arg(short, long)]
        mode: String,

        /// Selected content sets
        #[arg(short, long = "set")]
        sets: Vec<String>,

        /// Number of selected items
        #[arg(short, long, default_value = "0")]
        count: u32,

        /// Route the session was started from
        #[arg(short, long, default_value = "")]
        route: String,
    },

    /// Append an attempt to an active session
    Attempt(AttemptArgs),

    /// Finalize an active session
    Finalize(FinalizeArgs),

    /// Drop an active session without recording it
    Discard {
        /// Session ID
        session_id: String,
    },
}

/// Arguments for `session attempt`
#[derive(clap::Args, Debug)]
pub struct AttemptArgs {
    /// Session ID
    pub session_id: String,

    /// Question identity
    #[arg(long)]
    pub question_id: String,

    /// Prompt shown to the player
    #[arg(long)]
    pub prompt: String,

    /// Accepted answers
    #[arg(short, long = "expected", required = true)]
    pub expected: Vec<String>,

    /// Answer given
    #[arg(short, long)]
    pub answer: String,

    /// Input kind (pick, type, word_building)
    #[arg(short, long, default_value = "pick")]
    pub kind: InputKind,

    /// Mark the answer as correct
    #[arg(long)]
    pub correct: bool,

    /// Time taken to answer, in milliseconds
    #[arg(long)]
    pub time_ms: Option<u64>,

    /// Extra metadata as key=value (repeatable)
    #[arg(long = "extra")]
    pub extra: Vec<String>,
}

/// Arguments for `session finalize`
#[derive(clap::Args, Debug)]
pub struct FinalizeArgs {
    /// Session ID
    pub session_id: String,

    /// Why the session ended
    #[arg(long, default_value = "completed")]
    pub reason: EndedReason,

    /// The session ended abruptly
    #[arg(long)]
    pub abrupt: bool,

    /// Correct answers
    #[arg(long, default_value = "0")]
    pub correct: u32,

    /// Wrong answers
    #[arg(long, default_value = "0")]
    pub wrong: u32,

    /// Best streak reached
    #[arg(long, default_value = "0")]
    pub best_streak: u32,

    /// Stars earned
    #[arg(long)]
    pub stars: Option<u32>,

    /// Mode-specific payload as key=value (repeatable)
    #[arg(short, long = "payload")]
    pub payload: Vec<String>,
}

/// Arguments for the history subcommand
#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

/// History subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List recent sessions
    List {
        /// Maximum number of sessions to show (defaults to settings)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a specific session
    Show {
        /// Session ID
        session_id: String,
    },

    /// List sessions that were started but never finalized
    Active,

    /// Drop old sessions, keeping the most recent ones
    Prune {
        /// Number of sessions to keep, at least 1 (defaults to settings)
        #[arg(short, long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        keep: Option<usize>,
    },

    /// Clear all history
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}
