//! Autoconf mode implementation.
//!
//! Answers whether the interrupts file is currently readable. Both answers
//! are a successful run; munin-node decides what to do with a "no".

use std::path::Path;

use anyhow::Result;
use nix::unistd::{access, AccessFlags};

/// Probes the interrupts file and prints the munin autoconf answer.
pub fn command_autoconf(procfile: &Path) -> Result<()> {
    match access(procfile, AccessFlags::R_OK) {
        Ok(()) => println!("yes"),
        Err(errno) => println!(
            "no ({} isn't readable: {})",
            procfile.display(),
            errno.desc()
        ),
    }
    Ok(())
}
