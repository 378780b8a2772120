// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! stowd - The stowaway offline agent.
//!
//! Keeps a durable queue of offline actions in `~/.local/state/stowaway/`,
//! listens on a Unix socket for applications, and optionally runs an
//! intercepting proxy with an offline asset cache.
//!
//! Usage:
//!   stowd [--state-dir <path>] [--config <path>] [--verbose] [--foreground]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use stowd::config::{AgentConfig, CONFIG_FILE_NAME};
use stowd::{agent, env, lifecycle};

/// stowd: offline queue and sync agent
#[derive(Parser, Debug)]
#[command(name = "stowd", version)]
#[command(about = "Offline queue, sync and asset cache agent")]
struct Args {
    /// State directory for the database, socket, lock and log files
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Config file (default: <state-dir>/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log to stderr instead of the log file
    #[arg(long)]
    foreground: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let state_dir = args.state_dir.unwrap_or_else(env::default_state_dir);

    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("stowd: cannot create {}: {}", state_dir.display(), e);
        return ExitCode::FAILURE;
    }

    setup_logging(&lifecycle::log_path(&state_dir), args.verbose, args.foreground);
    tracing::info!("stowd starting, state_dir={}", state_dir.display());

    let config_path = args
        .config
        .unwrap_or_else(|| state_dir.join(CONFIG_FILE_NAME));

    match run(&state_dir, &config_path) {
        Ok(()) => {
            tracing::info!("stowd stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("stowd: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(state_dir: &Path, config_path: &Path) -> stowd::Result<()> {
    let config = AgentConfig::load(config_path)?;

    // Held for the lifetime of the process
    let _lock = lifecycle::acquire_lock(&lifecycle::lock_path(state_dir))?;

    let pid_path = lifecycle::pid_path(state_dir);
    lifecycle::write_pid_file(&pid_path)?;
    let socket_path = config.socket_path(state_dir);

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(stowd::Error::from)
        .and_then(|runtime| runtime.block_on(agent::run(state_dir, config, shutdown_signal())));

    lifecycle::cleanup(&pid_path, &socket_path);
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn setup_logging(log_path: &Path, verbose: bool, foreground: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(env::names::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = if foreground {
        None
    } else {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .ok()
    };

    // Fall back to stderr when the log file cannot be opened
    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}
