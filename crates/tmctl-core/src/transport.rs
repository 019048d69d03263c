//! Transport trait for radio communication.
//!
//! The [`Transport`] trait abstracts over the physical link to the radio.
//! `tmctl-transport` implements it for serial ports and
//! `tmctl-test-harness` provides scripted and simulated implementations, so
//! the protocol adapter in `tmctl-kenwood` never touches a serial port
//! directly.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a radio.
///
/// Implementations move raw bytes only. Line framing, echo verification and
/// resynchronization are handled by the protocol adapter on top.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the radio.
    ///
    /// Implementations should return once all bytes have been handed to the
    /// underlying device.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the radio into the provided buffer.
    ///
    /// Returns the number of bytes actually read, which may be fewer than
    /// `buf.len()`. Waits up to `timeout` for data to arrive; returns
    /// [`Error::Timeout`](crate::error::Error::Timeout) if nothing arrived
    /// within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
