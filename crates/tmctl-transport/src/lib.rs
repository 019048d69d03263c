//! Transport implementations for tmctl.
//!
//! Provides [`SerialTransport`], the concrete [`Transport`](tmctl_core::Transport)
//! used to reach a TM-271A/TM-281A through its PC port.
//!
//! # Example
//!
//! ```no_run
//! use tmctl_transport::SerialTransport;
//! use tmctl_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> tmctl_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 9600).await?;
//! transport.send(b"FQ\r").await?;
//!
//! let mut buf = [0u8; 64];
//! let n = transport.receive(&mut buf, Duration::from_millis(100)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{
    DataBits, DEFAULT_BAUD_RATE, FlowControl, Parity, SerialConfig, SerialTransport, StopBits,
};
