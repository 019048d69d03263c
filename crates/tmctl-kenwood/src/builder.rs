//! Tm271Builder -- fluent builder for constructing [`Tm271Radio`] instances.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters and transaction tunables before the port is opened.
//!
//! # Example
//!
//! ```no_run
//! use tmctl_kenwood::builder::Tm271Builder;
//! use std::time::Duration;
//!
//! # async fn example() -> tmctl_core::Result<()> {
//! let mut radio = Tm271Builder::new()
//!     .serial_port("/dev/ttyUSB0")
//!     .read_timeout(Duration::from_millis(150))
//!     .build()
//!     .await?;
//! println!("{}", radio.read_frequency().await?);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tracing::{debug, info};

use tmctl_core::error::{Error, Result};
use tmctl_core::transport::Transport;
use tmctl_transport::{SerialTransport, DEFAULT_BAUD_RATE};

use crate::channel::LineChannel;
use crate::radio::Tm271Radio;
use crate::transaction::{
    EngineConfig, DEFAULT_DRAIN_CHUNK, DEFAULT_READ_TIMEOUT, DEFAULT_RETRY_BUDGET,
};

/// How long to let the radio settle after the port opens.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Fluent builder for [`Tm271Radio`].
pub struct Tm271Builder {
    serial_port: Option<String>,
    baud_rate: u32,
    retry_budget: u32,
    read_timeout: Duration,
    drain_chunk: usize,
    settle_delay: Duration,
    announce: bool,
}

impl Tm271Builder {
    pub fn new() -> Self {
        Tm271Builder {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            retry_budget: DEFAULT_RETRY_BUDGET,
            read_timeout: DEFAULT_READ_TIMEOUT,
            drain_chunk: DEFAULT_DRAIN_CHUNK,
            settle_delay: DEFAULT_SETTLE_DELAY,
            announce: false,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate (9600).
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set how many times a command is sent before giving up (default: 50).
    pub fn retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Set how long each read and drain waits for the radio (default: 100ms).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the most stale bytes a single drain discards (default: 1000).
    pub fn drain_chunk(mut self, bytes: usize) -> Self {
        self.drain_chunk = bytes;
        self
    }

    /// Set the pause between opening the port and the first command
    /// (default: 500ms).
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Send `AE` after identifying. Some firmware revisions ignore commands
    /// until they have seen it.
    pub fn announce(mut self, enabled: bool) -> Self {
        self.announce = enabled;
        self
    }

    fn engine_config(&self) -> Result<EngineConfig> {
        if self.retry_budget == 0 {
            return Err(Error::InvalidParameter(
                "retry_budget must be at least 1".into(),
            ));
        }
        Ok(EngineConfig {
            retry_budget: self.retry_budget,
            drain_chunk: self.drain_chunk,
            read_timeout: self.read_timeout,
        })
    }

    /// Build a [`Tm271Radio`] with a caller-provided transport.
    ///
    /// This is the entry point for tests (pass a `MockTransport` or
    /// `SimulatedRadio` from `tmctl-test-harness`). No settle delay is
    /// applied and no commands are sent.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Tm271Radio> {
        let config = self.engine_config()?;
        Ok(Tm271Radio::new(LineChannel::new(transport), config))
    }

    /// Open the serial port, let the radio settle, and identify it.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    /// A port that cannot be opened, or a radio that never answers `ID`,
    /// fails with [`Error::ChannelUnavailable`].
    pub async fn build(self) -> Result<Tm271Radio> {
        let config = self.engine_config()?;
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;

        let transport = SerialTransport::open(port, self.baud_rate).await?;
        debug!(port, settle = ?self.settle_delay, "port open, waiting for radio to settle");
        tokio::time::sleep(self.settle_delay).await;

        let mut radio = Tm271Radio::new(LineChannel::new(Box::new(transport)), config);
        bootstrap(&mut radio, self.announce)
            .await
            .map_err(|e| Error::ChannelUnavailable(format!("{port}: {e}")))?;

        info!(port, model = radio.model().unwrap_or_default(), "session ready");
        Ok(radio)
    }
}

impl Default for Tm271Builder {
    fn default() -> Self {
        Self::new()
    }
}

async fn bootstrap(radio: &mut Tm271Radio, announce: bool) -> Result<()> {
    radio.identify().await?;
    if announce {
        radio.announce().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmctl_test_harness::{MockTransport, SimulatedRadio};

    #[tokio::test]
    async fn builder_defaults() {
        let radio = Tm271Builder::new()
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();

        let config = radio.engine_config();
        assert_eq!(config.retry_budget, 50);
        assert_eq!(config.drain_chunk, 1000);
        assert_eq!(config.read_timeout, Duration::from_millis(100));
        assert_eq!(radio.model(), None);
    }

    #[tokio::test]
    async fn builder_custom_settings() {
        let radio = Tm271Builder::new()
            .serial_port("/dev/ttyUSB1")
            .baud_rate(4800)
            .retry_budget(7)
            .drain_chunk(64)
            .read_timeout(Duration::from_millis(250))
            .settle_delay(Duration::ZERO)
            .announce(true)
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();

        let config = radio.engine_config();
        assert_eq!(config.retry_budget, 7);
        assert_eq!(config.drain_chunk, 64);
        assert_eq!(config.read_timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn builder_rejects_zero_retry_budget() {
        let result = Tm271Builder::new()
            .retry_budget(0)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = Tm271Builder::new().build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_missing_port_is_channel_unavailable() {
        let result = Tm271Builder::new()
            .serial_port("/dev/tmctl-no-such-port")
            .settle_delay(Duration::ZERO)
            .build()
            .await;
        assert!(matches!(result, Err(Error::ChannelUnavailable(_))));
    }

    #[tokio::test]
    async fn build_with_transport_sends_nothing() {
        let sim = SimulatedRadio::new();
        let _radio = Tm271Builder::new()
            .build_with_transport(Box::new(sim.clone()))
            .await
            .unwrap();
        assert!(sim.received_lines().await.is_empty());
    }

    #[tokio::test]
    async fn bootstrap_identifies_and_announces() {
        let sim = SimulatedRadio::new();
        let mut radio = Tm271Builder::new()
            .build_with_transport(Box::new(sim.clone()))
            .await
            .unwrap();

        bootstrap(&mut radio, true).await.unwrap();
        assert_eq!(radio.model(), Some("TM-271"));
        assert_eq!(sim.received_lines().await, vec!["ID", "AE"]);
    }
}
