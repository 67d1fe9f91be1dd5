//! Fetch mode implementation.
//!
//! Runs the parse without description capture and emits one value line per
//! interrupt. Any parse failure leaves stdout untouched.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;

use munin_irqstats::{read_interrupts, write_fetch, Arch};

/// Parses the interrupts file and writes the value block to stdout.
pub fn command_fetch(procfile: &Path, arch: Arch) -> Result<()> {
    let interrupts = read_interrupts(procfile, arch, false)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_fetch(&mut out, &interrupts)?;
    out.flush()?;
    Ok(())
}
