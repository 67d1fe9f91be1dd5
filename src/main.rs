//! munin-irqstats - version 0.1.0
//!
//! Munin plugin reporting per-IRQ interrupt counters from /proc/interrupts.
//! This is the entry point that resolves configuration and dispatches the
//! plugin mode; one pass per invocation, then the process terminates.

mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, Level};

use cli::{Args, LogLevel, Mode};
use commands::{command_autoconf, command_config, command_fetch};
use config::{resolve_config, Config};

/// Initializes tracing logging subsystem with configured log level.
///
/// Diagnostics go to stderr; stdout belongs to the plugin protocol.
fn setup_logging(config: &Config, args: &Args) {
    let log_level = match &args.log_level {
        Some(LogLevel::Off) | Some(LogLevel::Error) => Level::ERROR,
        Some(LogLevel::Warn) => Level::WARN,
        Some(LogLevel::Info) => Level::INFO,
        Some(LogLevel::Debug) => Level::DEBUG,
        Some(LogLevel::Trace) => Level::TRACE,
        None => match config.log_level.as_deref() {
            Some("off") | Some("error") => Level::ERROR,
            Some("info") => Level::INFO,
            Some("debug") => Level::DEBUG,
            Some("trace") => Level::TRACE,
            _ => Level::WARN,
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Main application entry point.
fn main() -> ExitCode {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    setup_logging(&config, &args);

    let procfile = config.procfile();
    let result = match args.mode {
        Mode::Autoconf => command_autoconf(&procfile),
        Mode::Config => command_config(&procfile, config.arch()),
        Mode::Fetch => command_fetch(&procfile, config.arch()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
