//! CLI arguments for munin-irqstats.
//!
//! This module defines the command-line interface structure using the clap
//! library. munin-node passes the mode as a single positional argument and
//! delivers plugin-conf.d settings as environment variables, so the options
//! double as `env.*` bindings.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use munin_irqstats::Arch;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Munin plugin invocation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Report whether the interrupts file is readable
    Autoconf,
    /// Emit the graph and field declaration block
    Config,
    /// Emit the current counter values
    Fetch,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "munin-irqstats",
    about = "Munin plugin reporting per-IRQ interrupt counters from /proc/interrupts",
    version = "0.1.0"
)]
pub struct Args {
    /// Plugin mode, as invoked by munin-node
    #[arg(value_enum, default_value = "fetch")]
    pub mode: Mode,

    /// Path of the interrupts pseudo-file (plugin-conf.d: env.procfile)
    #[arg(long, env = "procfile")]
    pub procfile: Option<PathBuf>,

    /// Architecture layout rules (plugin-conf.d: env.arch)
    #[arg(long, value_enum, env = "arch")]
    pub arch: Option<Arch>,

    /// Log level for stderr diagnostics (plugin-conf.d: env.log_level)
    #[arg(long, value_enum, env = "log_level")]
    pub log_level: Option<LogLevel>,

    /// Config file (TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,
}
