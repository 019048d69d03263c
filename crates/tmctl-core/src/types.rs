//! Value types shared by the protocol adapter and the command-line front end.
//!
//! Each type knows its own wire representation for the TM-271A/TM-281A
//! command set, so builders in `tmctl-kenwood` never hard-code the digits.

use std::fmt;
use std::str::FromStr;

/// Repeater shift (offset direction) stored in the VFO record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shift {
    /// No offset.
    #[default]
    Simplex,
    /// Transmit above the receive frequency.
    Plus,
    /// Transmit below the receive frequency.
    Minus,
}

impl Shift {
    /// The single-digit code used in the shift field of the `VF` record.
    pub fn code(&self) -> &'static str {
        match self {
            Shift::Simplex => "0",
            Shift::Plus => "1",
            Shift::Minus => "2",
        }
    }

    /// Parse a shift field value from the `VF` record.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Shift::Simplex),
            "1" => Some(Shift::Plus),
            "2" => Some(Shift::Minus),
            _ => None,
        }
    }

    /// Map a trailing `+`/`-` suffix character to a shift direction.
    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            '+' => Some(Shift::Plus),
            '-' => Some(Shift::Minus),
            _ => None,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Simplex => write!(f, "simplex"),
            Shift::Plus => write!(f, "+"),
            Shift::Minus => write!(f, "-"),
        }
    }
}

/// Transmit power setting.
///
/// The radio supports three steps; the controller only exposes the two
/// extremes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerLevel {
    High,
    Low,
}

impl PowerLevel {
    /// The parameter used in the `PC` command.
    pub fn code(&self) -> &'static str {
        match self {
            PowerLevel::High => "0",
            PowerLevel::Low => "2",
        }
    }
}

impl fmt::Display for PowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerLevel::High => write!(f, "high"),
            PowerLevel::Low => write!(f, "low"),
        }
    }
}

/// Error returned when a string cannot be parsed into a [`PowerLevel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePowerLevelError(String);

impl fmt::Display for ParsePowerLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown power level: {:?} (expected h or l)", self.0)
    }
}

impl std::error::Error for ParsePowerLevelError {}

impl FromStr for PowerLevel {
    type Err = ParsePowerLevelError;

    /// Only the first character counts, case-insensitively, so `h`, `H`,
    /// `high` and `hi` all select high power.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('h') => Ok(PowerLevel::High),
            Some('l') => Ok(PowerLevel::Low),
            _ => Err(ParsePowerLevelError(s.to_string())),
        }
    }
}

/// Which side of the subaudible tone system to enable.
///
/// The radio can either encode a tone on transmit or require it on receive
/// (CTCSS squelch), never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToneMode {
    /// Transmit tone encode.
    Tone,
    /// Receive tone squelch.
    Ctcss,
}

impl ToneMode {
    /// Values for the (tone-enable, CTCSS-enable) record fields.
    pub fn enable_flags(&self) -> (&'static str, &'static str) {
        match self {
            ToneMode::Tone => ("1", "0"),
            ToneMode::Ctcss => ("0", "1"),
        }
    }
}

impl fmt::Display for ToneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneMode::Tone => write!(f, "tone"),
            ToneMode::Ctcss => write!(f, "ctcss"),
        }
    }
}

/// Front panel operating mode selected with the `VM` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    Vfo,
    Memory,
}

impl ChannelMode {
    /// The parameter used in the `VM` command.
    pub fn code(&self) -> &'static str {
        match self {
            ChannelMode::Vfo => "0",
            ChannelMode::Memory => "1",
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelMode::Vfo => write!(f, "VFO"),
            ChannelMode::Memory => write!(f, "memory"),
        }
    }
}
