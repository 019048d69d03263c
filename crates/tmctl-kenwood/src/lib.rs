//! Kenwood TM-271A/TM-281A control over the radio's serial command port.
//!
//! The radio speaks a line protocol: ASCII commands terminated by a carriage
//! return, answered by a reply that echoes the command mnemonic. The link is
//! unreliable in practice (replies get lost, garbled, or come back as `?`),
//! so every command goes through a retrying transaction engine. This crate
//! provides:
//!
//! - **Protocol codec** ([`protocol`]) -- line framing, prefix matching and
//!   error-token detection.
//! - **Line channel** ([`channel`]) -- bounded drains and deadline-bounded
//!   line reads over any [`Transport`](tmctl_core::Transport).
//! - **Transaction engine** ([`transaction`]) -- send, verify the echo,
//!   resynchronize and retry.
//! - **VFO record codec** ([`record`]) -- the 13-field `VF` record, patched
//!   field by field.
//! - **Tone table** ([`tones`]) -- the 42 CTCSS tones and their indices.
//! - **Command builders** ([`commands`]) -- command lines, argument
//!   normalization and reply parsing.
//! - **Radio driver** ([`radio`]) -- memory, VFO, tone, power and frequency
//!   operations.
//! - **Builder** ([`builder`]) -- opens the port and identifies the radio.
//!
//! # Example
//!
//! ```
//! use tmctl_kenwood::commands::{parse_vfo_argument, parse_frequency_response};
//! use tmctl_kenwood::record::{VfoField, VfoRecord};
//! use tmctl_core::Shift;
//!
//! let (freq, shift) = parse_vfo_argument("147330+").unwrap();
//! assert_eq!(freq, "0147330000");
//! assert_eq!(shift, Shift::Plus);
//!
//! let record = VfoRecord::parse("VF 0145000000,0,0,0,0,0,0,08,08,000,00600000,0,0").unwrap();
//! let patched = record
//!     .patch(&[(VfoField::Frequency, freq.as_str()), (VfoField::Shift, shift.code())])
//!     .unwrap();
//! assert_eq!(
//!     patched.to_command(),
//!     "VF 0147330000,0,1,0,0,0,0,08,08,000,00600000,0,0"
//! );
//!
//! assert_eq!(parse_frequency_response("FQ 0147330000,0").unwrap(), "147.330000");
//! ```

pub mod builder;
pub mod channel;
pub mod commands;
pub mod protocol;
pub mod radio;
pub mod record;
pub mod tones;
pub mod transaction;

// Re-export the primary types for ergonomic `use tmctl_kenwood::*`.
pub use builder::Tm271Builder;
pub use radio::Tm271Radio;
pub use record::{VfoField, VfoRecord};
pub use transaction::{EngineConfig, TransactionEngine};
