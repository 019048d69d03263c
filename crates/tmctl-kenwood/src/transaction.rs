//! Request/response exchange with echo verification and resynchronization.
//!
//! The link has no framing beyond the line terminator and no sequence
//! numbers, so the only evidence that the radio took a command is a reply
//! that starts with the same mnemonic. Anything else (`?`, `E`, the tail of
//! an older line, silence) means the command was not taken: the engine
//! flushes the link and sends the command again, up to a fixed budget.
//!
//! One exchange walks this state machine:
//!
//! ```text
//!            +-----------------------------------------------+
//!            v                                               |
//!   Sending --> AwaitingReply --+--> Accepted                |
//!                               |                            |
//!                               +--> Resyncing --------------+
//!                                        | (budget spent)
//!                                        v
//!                                  Error::NoSync
//! ```

use std::time::Duration;

use tracing::{debug, trace, warn};

use tmctl_core::error::{Error, Result};

use crate::channel::LineChannel;
use crate::protocol;

/// Number of times a command is sent before giving up.
pub const DEFAULT_RETRY_BUDGET: u32 = 50;

/// Upper bound on stale bytes thrown away by a single drain.
pub const DEFAULT_DRAIN_CHUNK: usize = 1000;

/// How long a single read waits for the radio.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Tunables for the transaction engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of times a command line is written per exchange.
    pub retry_budget: u32,
    /// Maximum bytes discarded by each drain.
    pub drain_chunk: usize,
    /// Deadline for each drain and each line read.
    pub read_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            retry_budget: DEFAULT_RETRY_BUDGET,
            drain_chunk: DEFAULT_DRAIN_CHUNK,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Where an exchange currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// About to drain stale input and write the command.
    Sending,
    /// Command written, waiting for one reply line.
    AwaitingReply,
    /// The reply echoed the command prefix.
    Accepted(String),
    /// The reply was garbage; flush the link before the next attempt.
    Resyncing(String),
}

/// A successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The accepted reply, terminator stripped.
    pub reply: String,
    /// How many times the command was written, including the accepted one.
    pub attempts: u32,
}

/// Sends command lines and waits for their echoed replies.
pub struct TransactionEngine {
    channel: LineChannel,
    config: EngineConfig,
}

impl TransactionEngine {
    pub fn new(channel: LineChannel, config: EngineConfig) -> Self {
        TransactionEngine { channel, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Change the retry budget for subsequent exchanges.
    pub fn set_retry_budget(&mut self, budget: u32) {
        self.config.retry_budget = budget;
    }

    /// Send `line` and return the reply that acknowledges it.
    pub async fn execute(&mut self, line: &str) -> Result<String> {
        Ok(self.exchange(line).await?.reply)
    }

    /// Like [`execute`](Self::execute), but also reports how many attempts
    /// the exchange took.
    ///
    /// Fails with [`Error::NoSync`] once the retry budget is spent. Transport
    /// failures other than read timeouts abort the exchange immediately.
    pub async fn exchange(&mut self, line: &str) -> Result<Exchange> {
        if line.is_empty() || line.contains('\r') {
            return Err(Error::InvalidParameter(format!(
                "command line must be non-empty and unterminated: {line:?}"
            )));
        }

        let mut attempts = 0u32;
        let mut phase = Phase::Sending;

        loop {
            phase = match phase {
                Phase::Sending => {
                    if attempts >= self.config.retry_budget {
                        return Err(self.no_sync(line, attempts));
                    }
                    attempts += 1;
                    self.drain().await?;
                    self.channel.write_line(line).await?;
                    Phase::AwaitingReply
                }
                Phase::AwaitingReply => {
                    let reply = self.channel.read_line(self.config.read_timeout).await?;
                    if protocol::reply_matches(line, &reply) {
                        Phase::Accepted(reply)
                    } else {
                        Phase::Resyncing(reply)
                    }
                }
                Phase::Accepted(reply) => {
                    trace!(command = line, reply = %reply, attempts, "reply accepted");
                    return Ok(Exchange { reply, attempts });
                }
                Phase::Resyncing(reply) => {
                    debug!(
                        command = line,
                        reply = %reply.escape_debug(),
                        attempt = attempts,
                        error_token = protocol::is_error_token(&reply),
                        "no echo from radio, resynchronizing"
                    );
                    if attempts >= self.config.retry_budget {
                        return Err(self.no_sync(line, attempts));
                    }
                    self.channel.write_terminator().await?;
                    self.drain().await?;
                    self.drain().await?;
                    Phase::Sending
                }
            };
        }
    }

    async fn drain(&mut self) -> Result<usize> {
        self.channel
            .drain(self.config.drain_chunk, self.config.read_timeout)
            .await
    }

    fn no_sync(&self, line: &str, attempts: u32) -> Error {
        warn!(command = line, attempts, "retry budget exhausted");
        Error::NoSync {
            command: line.to_string(),
            attempts,
        }
    }

    /// Close the underlying channel.
    pub async fn close(&mut self) -> Result<()> {
        self.channel.close().await
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmctl_test_harness::{MockTransport, SimulatedRadio};

    fn engine_with(mock: MockTransport, retry_budget: u32) -> TransactionEngine {
        TransactionEngine::new(
            LineChannel::new(Box::new(mock)),
            EngineConfig {
                retry_budget,
                ..EngineConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn first_attempt_accepted() {
        let mut mock = MockTransport::new();
        mock.expect(b"ID\r", b"ID TM-271\r");

        let mut engine = engine_with(mock, 50);
        let exchange = engine.exchange("ID").await.unwrap();
        assert_eq!(exchange.reply, "ID TM-271");
        assert_eq!(exchange.attempts, 1);
    }

    #[tokio::test]
    async fn third_attempt_accepted_after_garbage() {
        let mut mock = MockTransport::new();
        mock.expect(b"VM 1\r", b"?\r");
        mock.expect(b"\r", b"?\r");
        mock.expect(b"VM 1\r", b"E\r");
        mock.expect(b"\r", b"?\r");
        mock.expect(b"VM 1\r", b"VM 1\r");

        let mut engine = engine_with(mock, 50);
        let exchange = engine.exchange("VM 1").await.unwrap();
        assert_eq!(exchange.reply, "VM 1");
        assert_eq!(exchange.attempts, 3);
    }

    #[tokio::test]
    async fn never_echoing_channel_exhausts_budget() {
        let budget = 5;
        let mut mock = MockTransport::new();
        for attempt in 1..=budget {
            mock.expect(b"FQ\r", b"E\r");
            if attempt < budget {
                mock.expect_silent(b"\r");
            }
        }

        let mut engine = engine_with(mock, budget);
        match engine.exchange("FQ").await {
            Err(Error::NoSync { command, attempts }) => {
                assert_eq!(command, "FQ");
                assert_eq!(attempts, budget);
            }
            other => panic!("expected NoSync, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn silence_counts_as_rejection() {
        let mut mock = MockTransport::new();
        mock.expect_silent(b"PC 2\r");
        mock.expect_silent(b"\r");
        mock.expect(b"PC 2\r", b"PC 2\r");

        let mut engine = engine_with(mock, 50);
        assert_eq!(engine.exchange("PC 2").await.unwrap().attempts, 2);
    }

    #[tokio::test]
    async fn stale_bytes_are_drained_before_sending() {
        let mut mock = MockTransport::new();
        mock.inject(b"VF 0145000000,0\r?\r");
        mock.expect(b"FQ\r", b"FQ 0147330000,0\r");

        let mut engine = engine_with(mock, 50);
        let exchange = engine.exchange("FQ").await.unwrap();
        assert_eq!(exchange.reply, "FQ 0147330000,0");
        assert_eq!(exchange.attempts, 1);
    }

    #[tokio::test]
    async fn tail_of_previous_reply_is_rejected() {
        let mut mock = MockTransport::new();
        mock.expect(b"FQ\r", b"0,0\r");
        mock.expect_silent(b"\r");
        mock.expect(b"FQ\r", b"FQ 0147330000,0\r");

        let mut engine = engine_with(mock, 50);
        let exchange = engine.exchange("FQ").await.unwrap();
        assert_eq!(exchange.attempts, 2);
    }

    #[tokio::test]
    async fn zero_budget_never_sends() {
        let mock = MockTransport::new();
        let mut engine = engine_with(mock, 0);
        assert!(matches!(
            engine.exchange("ID").await,
            Err(Error::NoSync { attempts: 0, .. })
        ));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let mock = MockTransport::new();
        let mut engine = engine_with(mock, 50);
        assert!(matches!(
            engine.execute("").await,
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            engine.execute("ID\rID").await,
            Err(Error::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn transport_failure_aborts_exchange() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        let mut engine = engine_with(mock, 50);
        assert!(matches!(
            engine.execute("ID").await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn simulated_radio_resync_counts_attempts() {
        let sim = SimulatedRadio::new();
        let observer = sim.clone();
        sim.garble_next(2).await;

        let mut engine = TransactionEngine::new(
            LineChannel::new(Box::new(sim)),
            EngineConfig::default(),
        );
        let exchange = engine.exchange("VM 1").await.unwrap();
        assert_eq!(exchange.attempts, 3);
        assert_eq!(observer.count_received("VM 1").await, 3);
        assert_eq!(observer.count_received("").await, 2);
        assert!(observer.memory_mode().await);
    }

    #[tokio::test]
    async fn retry_budget_is_adjustable() {
        let mut mock = MockTransport::new();
        mock.expect(b"ID\r", b"?\r");

        let mut engine = engine_with(mock, 50);
        engine.set_retry_budget(1);
        assert_eq!(engine.config().retry_budget, 1);
        assert!(matches!(
            engine.execute("ID").await,
            Err(Error::NoSync { attempts: 1, .. })
        ));
    }
}
