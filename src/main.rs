// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Dojo - practice session history
//!
//! Entry point for the Dojo CLI application.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use dojo::cli::{Cli, Commands};
use dojo::config::{BackendKind, Settings};
use dojo::history::SessionHistory;
use dojo::storage;

#[path = "main/cli_commands.rs"]
mod cli_commands;

use cli_commands::{run_history_command, run_session_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on the library's own diagnostics
    if cli.verbose > 0 {
        let level = if cli.verbose > 1 { "trace" } else { "debug" };
        if let Ok(parsed) = format!("dojo={}", level).parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Load settings
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load().context("failed to load settings")?,
    };

    if settings.storage.backend == BackendKind::Memory {
        tracing::warn!("In-memory backend selected; history is discarded when this command exits");
    }
    let backend = storage::open_backend(&settings)?;
    let history =
        Arc::new(SessionHistory::new(backend).with_key(settings.storage.key.clone()));

    // Dispatch to appropriate command
    match cli.command {
        Commands::Session(args) => {
            run_session_command(args, &history, &cli.format).await?;
        }
        Commands::History(args) => {
            run_history_command(args, &history, &settings, &cli.format).await?;
        }
    }

    Ok(())
}
