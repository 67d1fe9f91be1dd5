//! /proc/interrupts parsing and aggregation.
//!
//! This module reads the kernel's interrupt table, sums the per-CPU counter
//! columns into one total per interrupt and, in description-capture mode,
//! derives a human-readable device label plus the hardware IRQ number where
//! the platform exposes one distinct from the kernel's line number.
//!
//! The file is semi-structured and its column layout differs per CPU
//! architecture, so the description stage applies [`Arch`]-selected
//! heuristics. Any line that does not conform aborts the whole parse.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::arch::Arch;

/// Stop processing after this many interrupt lines have been seen.
pub const MAX_INTERRUPTS: usize = 256;
/// A line must be newline-terminated within this many bytes. Sufficient
/// even on a system with 256 threads.
pub const MAX_LINE_BYTES: usize = 4096;
/// Description tokens beyond this cap are silently discarded.
pub const MAX_DESCRIPTION_TOKENS: usize = 32;

/// One interrupt line, aggregated across all CPU columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interrupt {
    /// Kernel-assigned line name, numeric ("16") or symbolic ("NMI").
    pub name: String,
    /// Sum of every per-CPU counter on the line.
    pub count: u64,
    /// Device list, only populated in description-capture mode.
    pub description: Option<String>,
    /// Hardware-level IRQ number when it differs from the line name.
    pub hwirq: Option<u64>,
}

/// Conditions that abort an entire parse.
///
/// There is no line-level recovery: except for the documented benign skips
/// (ARM `FIQ:` lines, early end of counter scanning), any malformed line
/// fails the whole pass and nothing is reported.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("cannot open {path}: {source}")]
    InputUnavailable { path: String, source: io::Error },

    #[error("read failed at line {line}: {source}")]
    Read { line: usize, source: io::Error },

    #[error("line {line} overflows the 4096 byte line buffer")]
    LineOverflow { line: usize },

    #[error("line {line} is empty")]
    EmptyLine { line: usize },

    #[error("no header line found")]
    MissingHeader,

    #[error("expected CPU column in header, got '{token}'")]
    BadCpuColumn { token: String },

    #[error("expected name '{token}' to end in ':'")]
    BadName { token: String },

    #[error("interrupt '{name}' has no counters")]
    MissingCounters { name: String },

    #[error("interrupt '{name}' has only garbage '{token}'")]
    GarbageCounter { name: String, token: String },

    #[error("no interrupts found")]
    NoInterrupts,
}

/// Opens `path` and runs one parse pass over it.
///
/// The file handle is dropped on every exit path, success or failure.
pub fn read_interrupts(
    path: &Path,
    arch: Arch,
    capture_descriptions: bool,
) -> Result<Vec<Interrupt>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::InputUnavailable {
        path: path.display().to_string(),
        source,
    })?;
    parse_interrupts(BufReader::new(file), arch, capture_descriptions)
}

/// Parses a complete /proc/interrupts stream.
///
/// The first line establishes the per-CPU column count; every further line
/// contributes one [`Interrupt`] in first-seen order. Description capture is
/// only needed for Munin's config mode, fetch mode skips the tail entirely.
pub fn parse_interrupts<R: BufRead>(
    mut reader: R,
    arch: Arch,
    capture_descriptions: bool,
) -> Result<Vec<Interrupt>, ParseError> {
    let mut interrupts: Vec<Interrupt> = Vec::new();
    let mut cpu_columns = 0usize;
    let mut line_num = 0usize;
    let mut line_buf = Vec::with_capacity(MAX_LINE_BYTES);

    loop {
        line_buf.clear();
        let read = reader
            .read_until(b'\n', &mut line_buf)
            .map_err(|source| ParseError::Read {
                line: line_num,
                source,
            })?;
        if read == 0 {
            break;
        }

        if interrupts.len() == MAX_INTERRUPTS {
            debug!(line = line_num, "interrupt cap reached, ignoring further lines");
            break;
        }

        // A line that is not newline-terminated within the buffer limit is
        // either overlong or truncated at EOF; both fail the parse.
        if line_buf.len() > MAX_LINE_BYTES || line_buf.last() != Some(&b'\n') {
            return Err(ParseError::LineOverflow { line: line_num });
        }

        let line = String::from_utf8_lossy(&line_buf);
        let line = line.trim_end_matches('\n');

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(ParseError::EmptyLine { line: line_num });
        }

        // The first line has a column per CPU - count them.
        if line_num == 0 {
            for token in &tokens {
                if !token.starts_with("CPU") {
                    return Err(ParseError::BadCpuColumn {
                        token: token.to_string(),
                    });
                }
                cpu_columns += 1;
            }
            line_num += 1;
            continue;
        }

        // ARM emits an informational FIQ line listing only device names,
        // with no counters. Not an interrupt record.
        if matches!(arch, Arch::Arm) && tokens[0] == "FIQ:" {
            debug!(line = line_num, "skipping FIQ informational line");
            line_num += 1;
            continue;
        }

        let name = parse_name(tokens[0])?;

        // Sum the counter columns. Symbolic lines such as ERR or MIS may
        // carry fewer counters than there are CPUs; scanning stops at the
        // first non-counter token as long as at least one was consumed.
        let mut count: u64 = 0;
        let mut counters = 0usize;
        for cpu_idx in 0..cpu_columns {
            let Some(token) = tokens.get(1 + cpu_idx) else {
                if cpu_idx == 0 {
                    return Err(ParseError::MissingCounters { name });
                }
                break;
            };
            let Some(value) = parse_counter(token) else {
                if cpu_idx == 0 {
                    return Err(ParseError::GarbageCounter {
                        name,
                        token: token.to_string(),
                    });
                }
                break;
            };
            count = count.saturating_add(value);
            counters += 1;
        }

        let mut interrupt = Interrupt {
            name,
            count,
            description: None,
            hwirq: None,
        };

        if capture_descriptions {
            let tail = tail_after_tokens(line, 1 + counters).trim();
            if !tail.is_empty() {
                extract_description(&mut interrupt, tail, arch);
            }
        }

        interrupts.push(interrupt);
        line_num += 1;
    }

    if line_num == 0 {
        return Err(ParseError::MissingHeader);
    }
    if interrupts.is_empty() {
        return Err(ParseError::NoInterrupts);
    }

    debug!(records = interrupts.len(), cpus = cpu_columns, "parse complete");
    Ok(interrupts)
}

/// Validates the name token and strips its trailing colon.
///
/// The colon must be the final character and must not occur elsewhere, so
/// "16:" yields "16" while ":", "16" and "a::" are all malformed.
fn parse_name(token: &str) -> Result<String, ParseError> {
    match token.strip_suffix(':') {
        Some(name) if !name.is_empty() && !name.contains(':') => Ok(name.to_string()),
        _ => Err(ParseError::BadName {
            token: token.to_string(),
        }),
    }
}

/// Parses one counter column: all-digit tokens only, saturating at u64::MAX.
fn parse_counter(token: &str) -> Option<u64> {
    if !is_numeric(token) {
        return None;
    }
    Some(token.parse::<u64>().unwrap_or(u64::MAX))
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric value of a token's leading digit run, saturating at u64::MAX.
/// A token without a leading digit parses as 0, as with C's strtoul.
fn leading_number(s: &str) -> u64 {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return 0;
    }
    s[..digits].parse::<u64>().unwrap_or(u64::MAX)
}

/// Returns the remainder of `line` after skipping `skip` whitespace-separated
/// tokens, preserving the tail's inner whitespace.
fn tail_after_tokens(line: &str, skip: usize) -> &str {
    let mut rest = line;
    for _ in 0..skip {
        rest = rest.trim_start();
        match rest.find(char::is_whitespace) {
            Some(end) => rest = &rest[end..],
            None => return "",
        }
    }
    rest
}

/// Classifies the trailing text after the counter columns into a device
/// description and an optional hardware IRQ number.
fn extract_description(interrupt: &mut Interrupt, tail: &str, arch: Arch) {
    // Symbolic interrupts (NMI, LOC, timers) have no structured tail; keep
    // the text as-is, inner whitespace included.
    if !is_numeric(&interrupt.name) {
        interrupt.description = Some(tail.to_string());
        return;
    }

    let tokens: Vec<&str> = tail
        .split_whitespace()
        .take(MAX_DESCRIPTION_TOKENS)
        .collect();

    // A single leftover token is the description; the layout rules below
    // all presuppose at least two tokens.
    if tokens.len() == 1 {
        interrupt.description = Some(tokens[0].to_string());
        return;
    }

    let name_value = leading_number(&interrupt.name);
    let (token_start, hwirq) = match arch {
        Arch::Sparc => sparc_layout(&tokens, name_value),
        _ => generic_layout(&tokens, name_value, arch),
    };
    interrupt.hwirq = hwirq;

    let description = tokens[token_start.min(tokens.len())..].join(" ");
    if !description.is_empty() {
        interrupt.description = Some(description);
    }
}

/// SPARC's interrupts layout differs: the controller column may be followed
/// by a dash-prefixed flags token before the device names.
///
/// SPARC has been seen to have many duplicate MSIQ interrupts (one per
/// thread), and similarly ambiguous SCHIZO_/PSYCHO_ controller names, so the
/// line's own IRQ number is reported there to differentiate.
fn sparc_layout(tokens: &[&str], name_value: u64) -> (usize, Option<u64>) {
    let token_start = if tokens.len() >= 2 && tokens[1].starts_with('-') {
        2
    } else {
        1
    };
    let hwirq = match tokens.get(token_start) {
        Some(&token)
            if token == "MSIQ"
                || token.starts_with("SCHIZO_")
                || token.starts_with("PSYCHO_") =>
        {
            Some(name_value)
        }
        _ => None,
    };
    (token_start, hwirq)
}

/// Layout rule for everything that is not SPARC.
///
/// Newer ARM, MIPS, PowerPC and some x86 place a numeric hardware IRQ in
/// the second tail column, optionally followed by a trigger-type token:
///
/// ```text
///                                                  [0]        [1][2]       [3-]
/// 38:     150262          0          0          0  OpenPIC    38 Level     i2c-mpc, i2c-mpc
///                     [0]   [1] [2-]
///  3:  247552271      MIPS   3  ehci_hcd:usb1
/// ```
///
/// Otherwise the tail is the plain x86/old-ARM shape of controller token
/// plus device names, where x86 APIC/PCI interrupts carry a combined
/// `18-fasteoi` / `1048579-edge` column worth stripping.
fn generic_layout(tokens: &[&str], name_value: u64, arch: Arch) -> (usize, Option<u64>) {
    if is_numeric(tokens[1]) {
        let value = leading_number(tokens[1]);
        let hwirq = (value != name_value).then_some(value);
        // MIPS has been seen to not show the type.
        let token_start = match tokens.get(2) {
            Some(&"Edge") | Some(&"Level") | Some(&"None") => 3,
            _ => 2,
        };
        (token_start, hwirq)
    } else if matches!(arch, Arch::X86)
        && tokens[1].starts_with(|c: char| c.is_ascii_digit())
        && (tokens[1].ends_with("-fasteoi") || tokens[1].ends_with("-edge"))
    {
        let value = leading_number(tokens[1]);
        let hwirq = (value != name_value).then_some(value);
        (2, hwirq)
    } else {
        (1, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &str, arch: Arch, capture: bool) -> Result<Vec<Interrupt>, ParseError> {
        parse_interrupts(Cursor::new(input.to_string()), arch, capture)
    }

    #[test]
    fn test_header_establishes_column_count() {
        let input = "CPU0 CPU1 CPU2\n0: 1 2 3\n";
        let records = parse(input, Arch::Other, false).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "0");
        assert_eq!(records[0].count, 6);
    }

    #[test]
    fn test_header_rejects_non_cpu_token() {
        let input = "CPU0 GPU1\n0: 1 2\n";
        let err = parse(input, Arch::Other, false).unwrap_err();
        assert!(matches!(err, ParseError::BadCpuColumn { token } if token == "GPU1"));
    }

    #[test]
    fn test_missing_header() {
        let err = parse("", Arch::Other, false).unwrap_err();
        assert!(matches!(err, ParseError::MissingHeader));
    }

    #[test]
    fn test_header_only_yields_no_interrupts() {
        let err = parse("CPU0\n", Arch::Other, false).unwrap_err();
        assert!(matches!(err, ParseError::NoInterrupts));
    }

    #[test]
    fn test_empty_line_fails() {
        let input = "CPU0\n\n0: 1\n";
        let err = parse(input, Arch::Other, false).unwrap_err();
        assert!(matches!(err, ParseError::EmptyLine { line: 1 }));
    }

    #[test]
    fn test_short_counter_row_sums_prefix() {
        // ERR-style lines carry a single counter regardless of CPU count.
        let input = "CPU0 CPU1 CPU2\nERR: 5 3\n";
        let records = parse(input, Arch::Other, false).unwrap();
        assert_eq!(records[0].count, 8);
    }

    #[test]
    fn test_first_counter_garbage_fails() {
        let input = "CPU0 CPU1\n7: junk 3\n";
        let err = parse(input, Arch::Other, false).unwrap_err();
        assert!(matches!(err, ParseError::GarbageCounter { name, token }
            if name == "7" && token == "junk"));
    }

    #[test]
    fn test_missing_counters_fails() {
        let input = "CPU0\nERR:\n";
        let err = parse(input, Arch::Other, false).unwrap_err();
        assert!(matches!(err, ParseError::MissingCounters { name } if name == "ERR"));
    }

    #[test]
    fn test_colon_is_stripped_from_name() {
        let records = parse("CPU0\n16: 42\n", Arch::Other, false).unwrap();
        assert_eq!(records[0].name, "16");
    }

    #[test]
    fn test_malformed_name_tokens_fail() {
        for bad in ["16", ":", "a::", "a:b:"] {
            let input = format!("CPU0\n{bad} 42\n");
            let err = parse(&input, Arch::Other, false).unwrap_err();
            assert!(
                matches!(err, ParseError::BadName { .. }),
                "token {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_counter_sum_saturates() {
        let input = format!("CPU0 CPU1\n0: {} 1\n", u64::MAX);
        let records = parse(&input, Arch::Other, false).unwrap();
        assert_eq!(records[0].count, u64::MAX);
    }

    #[test]
    fn test_fiq_line_skipped_on_arm() {
        let input = "CPU0\nFIQ: usb_fiq\n30: 7\n";
        let records = parse(input, Arch::Arm, false).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "30");
    }

    #[test]
    fn test_fiq_line_fails_elsewhere() {
        let input = "CPU0\nFIQ: usb_fiq\n";
        let err = parse(input, Arch::X86, false).unwrap_err();
        assert!(matches!(err, ParseError::GarbageCounter { .. }));
    }

    #[test]
    fn test_fetch_mode_skips_descriptions() {
        let input = "CPU0\n33: 617373 f1010140.gpio 17 Edge pps.-1\n";
        let records = parse(input, Arch::Other, false).unwrap();
        assert_eq!(records[0].description, None);
        assert_eq!(records[0].hwirq, None);
    }

    #[test]
    fn test_generic_openpic_line() {
        let input = "CPU0 CPU1 CPU2 CPU3\n\
                     38:     150262          0          0          0   OpenPIC    38 Level     i2c-mpc, i2c-mpc\n";
        let records = parse(input, Arch::Powerpc, true).unwrap();
        assert_eq!(records[0].count, 150262);
        assert_eq!(records[0].description.as_deref(), Some("i2c-mpc, i2c-mpc"));
        assert_eq!(records[0].hwirq, None);
    }

    #[test]
    fn test_generic_gpio_line_records_hwirq() {
        let input = "CPU0\n33:     617373  f1010140.gpio  17 Edge      pps.-1\n";
        let records = parse(input, Arch::Other, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("pps.-1"));
        assert_eq!(records[0].hwirq, Some(17));
    }

    #[test]
    fn test_generic_mips_line_without_type_token() {
        let input = "CPU0\n3:  247552271      MIPS   3  ehci_hcd:usb1\n";
        let records = parse(input, Arch::Mips, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("ehci_hcd:usb1"));
        assert_eq!(records[0].hwirq, None);
    }

    #[test]
    fn test_x86_fasteoi_suffix_stripped() {
        let input = "CPU0\n18: 5 IO-APIC 18-fasteoi eth0\n";
        let records = parse(input, Arch::X86, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("eth0"));
        assert_eq!(records[0].hwirq, None);
    }

    #[test]
    fn test_x86_edge_suffix_with_differing_hwirq() {
        let input = "CPU0\n1: 9 IO-APIC 1048579-edge i8042\n";
        let records = parse(input, Arch::X86, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("i8042"));
        assert_eq!(records[0].hwirq, Some(1048579));
    }

    #[test]
    fn test_suffix_rule_is_x86_only() {
        let input = "CPU0\n18: 5 IO-APIC 18-fasteoi eth0\n";
        let records = parse(input, Arch::Arm, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("18-fasteoi eth0"));
        assert_eq!(records[0].hwirq, None);
    }

    #[test]
    fn test_sparc_msiq_gets_own_irq_number() {
        let input = "CPU0\n20: 11 sun4v -msi MSIQ\n";
        let records = parse(input, Arch::Sparc, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("MSIQ"));
        assert_eq!(records[0].hwirq, Some(20));
    }

    #[test]
    fn test_sparc_psycho_prefix_without_dash_token() {
        let input = "CPU0\n21: 1 sun4u PSYCHO_PCIERR\n";
        let records = parse(input, Arch::Sparc, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("PSYCHO_PCIERR"));
        assert_eq!(records[0].hwirq, Some(21));
    }

    #[test]
    fn test_sparc_plain_device_has_no_hwirq() {
        let input = "CPU0\n15: 4 sun4v serial\n";
        let records = parse(input, Arch::Sparc, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("serial"));
        assert_eq!(records[0].hwirq, None);
    }

    #[test]
    fn test_symbolic_name_keeps_tail_verbatim() {
        let input = "CPU0 CPU1\nNMI: 3 4 Non-maskable  interrupts\n";
        let records = parse(input, Arch::X86, true).unwrap();
        assert_eq!(
            records[0].description.as_deref(),
            Some("Non-maskable  interrupts")
        );
    }

    #[test]
    fn test_single_token_tail_is_verbatim_description() {
        let input = "CPU0\n19: 5 uhci_hcd:usb1\n";
        let records = parse(input, Arch::X86, true).unwrap();
        assert_eq!(records[0].description.as_deref(), Some("uhci_hcd:usb1"));
        assert_eq!(records[0].hwirq, None);
    }

    #[test]
    fn test_description_empty_after_layout_is_absent() {
        // token_start lands past the last token, so there is no description.
        let input = "CPU0\n38: 7 OpenPIC 38\n";
        let records = parse(input, Arch::Other, true).unwrap();
        assert_eq!(records[0].description, None);
        assert_eq!(records[0].hwirq, None);
    }

    #[test]
    fn test_record_cap_stops_silently() {
        let mut input = String::from("CPU0\n");
        for i in 0..300 {
            input.push_str(&format!("{i}: 1\n"));
        }
        let records = parse(&input, Arch::Other, false).unwrap();
        assert_eq!(records.len(), MAX_INTERRUPTS);
        assert_eq!(records.last().unwrap().name, "255");
    }

    #[test]
    fn test_description_token_cap() {
        let tail: Vec<String> = (0..40).map(|i| format!("dev{i}")).collect();
        let input = format!("CPU0\n9: 1 {}\n", tail.join(" "));
        let records = parse(&input, Arch::Other, true).unwrap();
        // Controller token dropped, then tokens beyond the cap discarded.
        let expected = tail[1..MAX_DESCRIPTION_TOKENS].join(" ");
        assert_eq!(records[0].description.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_overlong_line_fails() {
        let input = format!("CPU0\n5: 1 {}\n", "x".repeat(MAX_LINE_BYTES));
        let err = parse(&input, Arch::Other, false).unwrap_err();
        assert!(matches!(err, ParseError::LineOverflow { line: 1 }));
    }

    #[test]
    fn test_unterminated_final_line_fails() {
        let err = parse("CPU0\n5: 1", Arch::Other, false).unwrap_err();
        assert!(matches!(err, ParseError::LineOverflow { line: 1 }));
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let input = "CPU0\n9: 1\n2: 1\nNMI: 1\n";
        let records = parse(input, Arch::Other, false).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["9", "2", "NMI"]);
    }
}
