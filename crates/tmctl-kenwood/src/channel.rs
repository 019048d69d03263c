//! Line-oriented view of a byte [`Transport`].
//!
//! [`LineChannel`] adds the two read disciplines the transaction engine
//! needs on top of raw `receive()` calls: a bounded drain that throws stale
//! bytes away, and a line read that stops at the terminator or at a deadline,
//! whichever comes first. Neither ever blocks past its timeout; a read that
//! runs out of time returns whatever partial data it has.

use std::time::Duration;

use bytes::BytesMut;
use tokio::time::Instant;
use tracing::trace;

use tmctl_core::error::{Error, Result};
use tmctl_core::transport::Transport;

use crate::protocol::{self, TERMINATOR};

/// Size of a single `receive()` call.
const READ_CHUNK: usize = 256;

/// A [`Transport`] plus a buffer of bytes received but not yet consumed.
pub struct LineChannel {
    transport: Box<dyn Transport>,
    pending: BytesMut,
}

impl LineChannel {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        LineChannel {
            transport,
            pending: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Write one command line followed by the terminator.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        self.transport.send(&protocol::encode_command(line)).await
    }

    /// Write a bare terminator, which makes the radio abandon any
    /// half-received line.
    pub async fn write_terminator(&mut self) -> Result<()> {
        self.transport.send(&[TERMINATOR]).await
    }

    /// Discard up to `max_bytes` of stale input.
    ///
    /// Buffered bytes are discarded first, then the transport is read until
    /// `max_bytes` have been thrown away or `timeout` expires. Returns the
    /// number of bytes discarded.
    pub async fn drain(&mut self, max_bytes: usize, timeout: Duration) -> Result<usize> {
        let from_buffer = self.pending.len().min(max_bytes);
        let _ = self.pending.split_to(from_buffer);
        let mut discarded = from_buffer;

        let deadline = Instant::now() + timeout;
        let mut buf = [0u8; READ_CHUNK];
        while discarded < max_bytes {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let want = (max_bytes - discarded).min(READ_CHUNK);
            match self.transport.receive(&mut buf[..want], remaining).await {
                Ok(0) | Err(Error::Timeout) => break,
                Ok(n) => discarded += n,
                Err(e) => return Err(e),
            }
        }

        if discarded > 0 {
            trace!(bytes = discarded, "drained stale input");
        }
        Ok(discarded)
    }

    /// Read one line, without its terminator.
    ///
    /// Returns early with the partial (possibly empty) line if `timeout`
    /// expires before a terminator arrives. Bytes after the terminator stay
    /// buffered for the next call.
    pub async fn read_line(&mut self, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        let mut buf = [0u8; READ_CHUNK];

        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == TERMINATOR) {
                let line = self.pending.split_to(pos + 1);
                return Ok(String::from_utf8_lossy(&line[..pos]).into_owned());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.transport.receive(&mut buf, remaining).await {
                Ok(0) | Err(Error::Timeout) => break,
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) => return Err(e),
            }
        }

        let partial = self.pending.split();
        trace!(bytes = partial.len(), "line read timed out");
        Ok(String::from_utf8_lossy(&partial).into_owned())
    }

    /// Number of bytes received but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Close the underlying transport.
    pub async fn close(&mut self) -> Result<()> {
        self.pending.clear();
        self.transport.close().await
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }
}
