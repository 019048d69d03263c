//! tmctl-core: Core traits, types, and error definitions for tmctl.
//!
//! This crate defines the pieces shared by the serial transport, the
//! TM-271A/TM-281A protocol adapter and the command-line front end.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`Shift`], [`PowerLevel`], [`ToneMode`], [`ChannelMode`] -- radio settings
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod helpers;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use tmctl_core::*`.
pub use error::{Error, Result};
pub use helpers::format_freq_mhz;
pub use transport::Transport;
pub use types::*;
