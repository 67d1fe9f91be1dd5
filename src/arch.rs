//! Architecture family selection for /proc/interrupts layout rules.
//!
//! The column layout after the counters differs per CPU architecture, so the
//! parser's description stage is driven by a strategy value chosen once at
//! startup: detected from the build target by default, overridable through
//! the CLI, a munin env binding, or the config file.

use clap::ValueEnum;
use serde::Deserialize;

/// Architecture family whose interrupt-table layout rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86,
    Arm,
    Powerpc,
    Mips,
    Sparc,
    /// Plain generic rules, no platform quirks.
    Other,
}

impl Arch {
    /// Architecture of the build target. Targets without dedicated layout
    /// rules fall back to `Other`.
    pub fn detect() -> Self {
        if cfg!(any(target_arch = "x86", target_arch = "x86_64")) {
            Arch::X86
        } else if cfg!(any(target_arch = "arm", target_arch = "aarch64")) {
            Arch::Arm
        } else if cfg!(any(target_arch = "powerpc", target_arch = "powerpc64")) {
            Arch::Powerpc
        } else if cfg!(any(target_arch = "mips", target_arch = "mips64")) {
            Arch::Mips
        } else if cfg!(any(target_arch = "sparc", target_arch = "sparc64")) {
            Arch::Sparc
        } else {
            Arch::Other
        }
    }
}
