//! Configuration management for munin-irqstats.
//!
//! This module handles loading and merging configuration from an optional
//! TOML file and CLI/env arguments. Precedence: CLI or munin env binding >
//! config file > built-in default.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::Args;
use munin_irqstats::Arch;

// Default configuration constants
pub const DEFAULT_PROCFILE: &str = "/proc/interrupts";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/munin-irqstats.toml";

/// Effective plugin configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Path of the interrupts pseudo-file
    pub procfile: Option<PathBuf>,

    /// Architecture layout rules; defaults to the build target
    pub arch: Option<Arch>,

    /// Logging
    pub log_level: Option<String>,
}

impl Config {
    /// Interrupts file path with the built-in default applied.
    pub fn procfile(&self) -> PathBuf {
        self.procfile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROCFILE))
    }

    /// Architecture rules with the build-target default applied.
    pub fn arch(&self) -> Arch {
        self.arch.unwrap_or_else(Arch::detect)
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(procfile) = &args.procfile {
        config.procfile = Some(procfile.clone());
    }

    if let Some(arch) = args.arch {
        config.arch = Some(arch);
    }

    if let Some(level) = &args.log_level {
        config.log_level = Some(format!("{level:?}").to_lowercase());
    }

    Ok(config)
}

/// Loads the TOML config file, or defaults when no file is present.
///
/// An explicitly passed path must exist and parse; the default path is
/// optional and silently skipped when absent.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(Config::default());
            }
            default.to_path_buf()
        }
    };

    let content = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content)?;
    info!("Loaded TOML configuration from: {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = Config::default();
        assert_eq!(config.procfile(), PathBuf::from(DEFAULT_PROCFILE));
        assert_eq!(config.arch(), Arch::detect());
    }

    #[test]
    fn test_toml_round_trip() {
        let config: Config =
            toml::from_str("procfile = \"/tmp/interrupts\"\narch = \"sparc\"\nlog_level = \"debug\"\n")
                .unwrap();
        assert_eq!(config.procfile(), PathBuf::from("/tmp/interrupts"));
        assert_eq!(config.arch(), Arch::Sparc);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_explicit_config_file_errors() {
        let result = load_config(Some(Path::new("/nonexistent/munin-irqstats.toml")));
        assert!(result.is_err());
    }
}
