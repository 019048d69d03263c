//! TM-271A/TM-281A line protocol framing.
//!
//! The radio's PC port speaks a half-duplex ASCII protocol. Every command is a
//! single line terminated by a carriage return; every reply is a line in the
//! same format that starts with the two-letter mnemonic of the command it
//! answers.
//!
//! # Command format
//!
//! ```text
//! <mnemonic>[ <params>]\r
//! ```
//!
//! - `mnemonic`: two uppercase ASCII characters (`ID`, `VM`, `MR`, `VF`, ...).
//! - `params`: optional, separated from the mnemonic by one space.
//! - Terminator: `\r` (0x0D).
//!
//! # Replies
//!
//! There are no sequence numbers or checksums. The only integrity signal is
//! that a good reply echoes the mnemonic. When the radio is confused it
//! answers with `?`, `E`, or the tail of an earlier line instead.

use bytes::{BufMut, BytesMut};

/// Command/reply terminator byte.
pub const TERMINATOR: u8 = b'\r';

/// Number of leading characters that identify a command and its reply.
pub const PREFIX_LEN: usize = 2;

/// Tokens the radio sends when it rejects or fails to parse a line.
pub const ERROR_TOKENS: &[&str] = &["?", "E"];

/// Encode a command line into raw bytes ready for transmission.
///
/// # Example
///
/// ```
/// use tmctl_kenwood::protocol::encode_command;
///
/// assert_eq!(encode_command("VM 1"), b"VM 1\r");
/// assert_eq!(encode_command("FQ"), b"FQ\r");
/// ```
pub fn encode_command(line: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(line.len() + 1);
    buf.put_slice(line.as_bytes());
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}

/// The leading [`PREFIX_LEN`] characters of a line, or the whole line if it
/// is shorter.
///
/// ```
/// use tmctl_kenwood::protocol::line_prefix;
///
/// assert_eq!(line_prefix("MR 033"), "MR");
/// assert_eq!(line_prefix("?"), "?");
/// assert_eq!(line_prefix(""), "");
/// ```
pub fn line_prefix(line: &str) -> &str {
    match line.char_indices().nth(PREFIX_LEN) {
        Some((end, _)) => &line[..end],
        None => line,
    }
}

/// Whether `reply` acknowledges `command`.
///
/// A reply is accepted iff its prefix equals the command's prefix. Nothing
/// else about the reply is inspected here.
pub fn reply_matches(command: &str, reply: &str) -> bool {
    line_prefix(reply) == line_prefix(command)
}

/// Whether a reply is one of the radio's error tokens.
pub fn is_error_token(reply: &str) -> bool {
    ERROR_TOKENS.contains(&reply)
}

/// Split an accepted reply into its mnemonic and parameter text.
///
/// The single space separating the two is dropped.
///
/// ```
/// use tmctl_kenwood::protocol::split_reply;
///
/// assert_eq!(split_reply("ID TM-271"), ("ID", "TM-271"));
/// assert_eq!(split_reply("VM"), ("VM", ""));
/// ```
pub fn split_reply(reply: &str) -> (&str, &str) {
    let prefix = line_prefix(reply);
    let rest = &reply[prefix.len()..];
    (prefix, rest.strip_prefix(' ').unwrap_or(rest))
}
