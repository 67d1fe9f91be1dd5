//! munin-irqstats library.
//!
//! Parses the kernel's /proc/interrupts table into per-interrupt records and
//! renders them in the Munin plugin protocol. The binary in this crate wraps
//! the library with the munin-node mode dispatch (autoconf / config / fetch);
//! the library itself is usable against any interrupts-shaped stream.
//!
//! # Usage
//!
//! ```rust
//! use munin_irqstats::{parse_interrupts, write_fetch, Arch};
//! use std::io::Cursor;
//!
//! let snapshot = "CPU0 CPU1\n16: 7 9 uhci_hcd:usb3\nNMI: 0 0\n";
//! let interrupts = parse_interrupts(Cursor::new(snapshot), Arch::X86, false).unwrap();
//!
//! let mut out = Vec::new();
//! write_fetch(&mut out, &interrupts).unwrap();
//! assert_eq!(out, b"i16.value 16\niNMI.value 0\n");
//! ```

pub mod arch;
pub mod interrupts;
pub mod report;

// Re-export main types for convenience
pub use arch::Arch;
pub use interrupts::{parse_interrupts, read_interrupts, Interrupt, ParseError};
pub use report::{write_config, write_fetch};
