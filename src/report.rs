//! Munin plugin protocol output.
//!
//! Writes the two stdout blocks munin-node consumes: the `config`
//! declaration block with graph and field metadata, and the `fetch` value
//! block. Field names are the interrupt name prefixed with `i`, since Munin
//! field names must not start with a digit.

use std::io::{self, Write};

use crate::interrupts::Interrupt;

const GRAPH_PREAMBLE: &str = "graph_title Individual interrupts\n\
    graph_args --base 1000 --logarithmic\n\
    graph_vlabel interrupts / ${graph_period}\n\
    graph_category system\n\
    graph_info Shows the number of different IRQs received by the kernel.  \
    High disk or network traffic can cause a high number of interrupts (with \
    good hardware and drivers this will be less so). Sudden high interrupt \
    activity with no associated higher system activity is not normal.\n";

const NMI_INFO: &str = "Non-maskable interrupt. Either 0 or quite high. If \
    it's normally 0 then just one NMI will often mark some hardware failure.";

const LOC_INFO: &str = "Local (per CPU core) APIC timer interrupt. Until \
    2.6.21 normally 250 or 1000 per second. On modern 'tickless' kernels it \
    more or less reflects how busy the machine is.";

/// Writes the declaration block for Munin's `config` mode.
///
/// Emits the graph preamble, a `graph_order` directive over all fields in
/// first-seen order, then label, optional info, and the DERIVE metric
/// declarations per interrupt.
pub fn write_config<W: Write>(out: &mut W, interrupts: &[Interrupt]) -> io::Result<()> {
    out.write_all(GRAPH_PREAMBLE.as_bytes())?;
    writeln!(out)?;

    write!(out, "graph_order")?;
    for interrupt in interrupts {
        write!(out, " i{}", interrupt.name)?;
    }
    writeln!(out)?;

    for interrupt in interrupts {
        write!(
            out,
            "i{}.label {}",
            interrupt.name,
            interrupt.description.as_deref().unwrap_or(&interrupt.name)
        )?;
        if let Some(hwirq) = interrupt.hwirq {
            write!(out, " [{hwirq}]")?;
        }
        writeln!(out)?;

        // Some, like ERR and MIS, do not have a description; only the two
        // well-known symbolic interrupts get a canned explanation then.
        if let Some(description) = &interrupt.description {
            write!(
                out,
                "i{}.info Interrupt {}, for device(s): {}",
                interrupt.name, interrupt.name, description
            )?;
            if let Some(hwirq) = interrupt.hwirq {
                write!(out, " [{hwirq}]")?;
            }
            writeln!(out)?;
        } else if interrupt.name == "NMI" {
            writeln!(out, "iNMI.info {NMI_INFO}")?;
        } else if interrupt.name == "LOC" {
            writeln!(out, "iLOC.info {LOC_INFO}")?;
        }

        writeln!(out, "i{}.type DERIVE", interrupt.name)?;
        writeln!(out, "i{}.min 0", interrupt.name)?;
    }

    Ok(())
}

/// Writes the value block for Munin's `fetch` mode.
pub fn write_fetch<W: Write>(out: &mut W, interrupts: &[Interrupt]) -> io::Result<()> {
    for interrupt in interrupts {
        writeln!(out, "i{}.value {}", interrupt.name, interrupt.count)?;
    }
    Ok(())
}
