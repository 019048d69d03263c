//! Scripted transport for deterministic testing of the protocol adapter.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. Responses are appended to an inbound byte queue,
//! so a test can also pre-load stale bytes, make the "radio" answer with
//! garbage, or deliver a reply in short reads.
//!
//! # Example
//!
//! ```
//! use tmctl_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // When the adapter sends `ID\r`, the radio answers `ID TM-271\r`.
//! mock.expect(b"ID\r", b"ID TM-271\r");
//! // The resync terminator gets no answer.
//! mock.expect_silent(b"\r");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use tmctl_core::error::{Error, Result};
use tmctl_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes made available to `receive()` once the request is seen.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing without hardware.
///
/// Expectations are consumed in order. A `send()` that does not match the
/// next expectation, or arrives when none are left, fails with
/// [`Error::Transport`]. `receive()` returns
/// [`Error::Timeout`] immediately when the inbound queue is empty, so tests
/// never actually wait.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// Bytes waiting to be read.
    inbound: VecDeque<u8>,
    /// Upper bound on bytes returned per `receive()` call.
    max_chunk: Option<usize>,
    /// Whether the transport is "connected".
    connected: bool,
    /// Whether `close()` reports a failure.
    fail_close: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            inbound: VecDeque::new(),
            max_chunk: None,
            connected: true,
            fail_close: false,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Add an expected request that produces no response at all.
    pub fn expect_silent(&mut self, request: &[u8]) {
        self.expect(request, &[]);
    }

    /// Make bytes available to `receive()` without any request, e.g. stale
    /// output left over from an earlier exchange.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    /// Deliver at most `n` bytes per `receive()` call.
    pub fn set_max_chunk(&mut self, n: usize) {
        self.max_chunk = Some(n.max(1));
    }

    /// Return all data that has been sent through this transport.
    ///
    /// Each element is the byte slice from one `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Make `close()` fail with [`Error::ConnectionLost`], as a port whose
    /// adapter vanished would. The transport still ends up disconnected.
    pub fn set_fail_close(&mut self, fail: bool) {
        self.fail_close = fail;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        match self.expectations.pop_front() {
            Some(expectation) if data == expectation.request.as_slice() => {
                self.inbound.extend(expectation.response);
                Ok(())
            }
            Some(expectation) => Err(Error::Transport(format!(
                "unexpected send data: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.request),
                String::from_utf8_lossy(data)
            ))),
            None => Err(Error::Transport(format!(
                "no more expectations in mock transport, got {:?}",
                String::from_utf8_lossy(data)
            ))),
        }
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.inbound.is_empty() {
            return Err(Error::Timeout);
        }

        let limit = self.max_chunk.unwrap_or(usize::MAX);
        let n = self.inbound.len().min(buf.len()).min(limit);
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.inbound.clear();
        if self.fail_close {
            return Err(Error::ConnectionLost);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
