//! TM-271A/TM-281A command builders, argument normalizers and reply parsers.
//!
//! Everything here is pure: functions build command lines (without the
//! terminator, which the channel appends) or interpret reply lines, and
//! perform no I/O.

use tmctl_core::{ChannelMode, Error, PowerLevel, Result, Shift};

use crate::protocol::split_reply;
use crate::record::FREQUENCY_DIGITS;

/// Digits in a memory channel number.
pub const MEMORY_DIGITS: usize = 3;

// ---------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------

/// Build an "identify radio" command (`ID`).
pub fn cmd_identify() -> String {
    "ID".to_string()
}

/// Build the announce/enable command (`AE`) some firmware variants want
/// before they accept other commands.
pub fn cmd_announce() -> String {
    "AE".to_string()
}

/// Build a "select VFO or memory mode" command (`VM 0` / `VM 1`).
pub fn cmd_select_mode(mode: ChannelMode) -> String {
    format!("VM {}", mode.code())
}

/// Build a "recall memory channel" command (`MR nnn`).
///
/// `channel` must already be normalized with [`normalize_memory_number`].
pub fn cmd_recall_memory(channel: &str) -> String {
    format!("MR {channel}")
}

/// Build a "read VFO record" command (`VF`).
pub fn cmd_read_vfo() -> String {
    "VF".to_string()
}

/// Build a "read displayed frequency" command (`FQ`).
pub fn cmd_read_frequency() -> String {
    "FQ".to_string()
}

/// Build a "set transmit power" command (`PC 0` high, `PC 2` low).
pub fn cmd_set_power(level: PowerLevel) -> String {
    format!("PC {}", level.code())
}

// ---------------------------------------------------------------
// Argument normalization
// ---------------------------------------------------------------

fn require_digits(what: &str, s: &str) -> Result<()> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidParameter(format!(
            "{what} must be decimal digits, got {s:?}"
        )));
    }
    Ok(())
}

/// Normalize a memory channel number to exactly three digits.
///
/// Longer input keeps its last three digits; shorter input is zero-padded
/// on the left.
///
/// ```
/// use tmctl_kenwood::commands::normalize_memory_number;
///
/// assert_eq!(normalize_memory_number("7").unwrap(), "007");
/// assert_eq!(normalize_memory_number("1033").unwrap(), "033");
/// ```
pub fn normalize_memory_number(mem: &str) -> Result<String> {
    require_digits("memory number", mem)?;
    let tail = &mem[mem.len().saturating_sub(MEMORY_DIGITS)..];
    Ok(format!("{tail:0>width$}", width = MEMORY_DIGITS))
}

/// Normalize frequency digits to the 10-digit hertz field of the VF record.
///
/// A leading `0` is prepended unless one is already there, the result is
/// cut to ten characters, and anything shorter is padded with trailing
/// zeros. That lets `147330` mean 147.330 MHz.
///
/// ```
/// use tmctl_kenwood::commands::normalize_frequency;
///
/// assert_eq!(normalize_frequency("147330"), "0147330000");
/// assert_eq!(normalize_frequency("0147330000"), "0147330000");
/// assert_eq!(normalize_frequency("4460062500"), "0446006250");
/// ```
pub fn normalize_frequency(digits: &str) -> String {
    let mut freq = String::with_capacity(FREQUENCY_DIGITS + 1);
    if !digits.starts_with('0') {
        freq.push('0');
    }
    freq.push_str(digits);
    freq.truncate(FREQUENCY_DIGITS);
    format!("{freq:0<width$}", width = FREQUENCY_DIGITS)
}

/// Split a `vfo` argument such as `147330+` into the normalized frequency
/// field and the repeater shift.
pub fn parse_vfo_argument(arg: &str) -> Result<(String, Shift)> {
    let (digits, shift) = match arg.chars().last().and_then(Shift::from_suffix) {
        Some(shift) => (&arg[..arg.len() - 1], shift),
        None => (arg, Shift::Simplex),
    };
    require_digits("frequency", digits)?;
    Ok((normalize_frequency(digits), shift))
}

// ---------------------------------------------------------------
// Reply parsers
// ---------------------------------------------------------------

/// Extract the model string from an `ID` reply (`ID TM-271` -> `TM-271`).
pub fn parse_identify_response(reply: &str) -> String {
    split_reply(reply).1.trim().to_string()
}

/// Turn an `FQ` reply into the `MHz.kHz` display string.
///
/// The reply carries a 10-digit hertz field after `FQ `; the display drops
/// the leading digit and the final hertz digit:
///
/// ```
/// use tmctl_kenwood::commands::parse_frequency_response;
///
/// assert_eq!(parse_frequency_response("FQ 0147330000,0").unwrap(), "147.330000");
/// ```
pub fn parse_frequency_response(reply: &str) -> Result<String> {
    let (mhz, khz) = match (reply.get(4..7), reply.get(7..13)) {
        (Some(mhz), Some(khz)) => (mhz, khz),
        _ => {
            return Err(Error::ProtocolMismatch(format!(
                "FQ reply too short: {reply:?}"
            )))
        }
    };
    if !(mhz.bytes().all(|b| b.is_ascii_digit()) && khz.bytes().all(|b| b.is_ascii_digit())) {
        return Err(Error::ProtocolMismatch(format!(
            "FQ reply frequency is not numeric: {reply:?}"
        )));
    }
    Ok(format!("{mhz}.{khz}"))
}
