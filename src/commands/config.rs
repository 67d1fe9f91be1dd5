//! Config mode implementation.
//!
//! Runs the parse in description-capture mode and emits the Munin
//! declaration block. Any parse failure leaves stdout untouched.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;

use munin_irqstats::{read_interrupts, write_config, Arch};

/// Parses the interrupts file and writes the declaration block to stdout.
pub fn command_config(procfile: &Path, arch: Arch) -> Result<()> {
    let interrupts = read_interrupts(procfile, arch, true)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_config(&mut out, &interrupts)?;
    out.flush()?;
    Ok(())
}
