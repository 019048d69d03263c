//! Serial port transport for the radio's PC port.
//!
//! The TM-271A and TM-281A expose their command port as plain RS-232 (usually
//! behind a USB programming cable) running 9600 baud, 8 data bits, no parity,
//! one stop bit, no handshaking. [`SerialConfig::default`] selects exactly
//! that; the other knobs exist for odd cables and adapters.
//!
//! # Example
//!
//! ```no_run
//! use tmctl_transport::SerialTransport;
//! use tmctl_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> tmctl_core::Result<()> {
//! let mut link = SerialTransport::open("/dev/ttyUSB0", 9600).await?;
//! link.send(b"ID\r").await?;
//!
//! let mut buf = [0u8; 64];
//! let n = link.receive(&mut buf, Duration::from_millis(100)).await?;
//! # Ok(())
//! # }
//! ```

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, trace, warn};

pub use tokio_serial::{DataBits, FlowControl, Parity, StopBits};

use tmctl_core::error::{Error, Result};
use tmctl_core::transport::Transport;

/// Baud rate of the TM-271A/TM-281A PC port.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Line settings for [`SerialTransport::open_with_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl SerialConfig {
    /// 8N1 without handshaking at the given rate.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        SerialConfig {
            baud_rate,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::with_baud_rate(DEFAULT_BAUD_RATE)
    }
}

/// An open serial port. Dropping it closes the device.
pub struct SerialTransport {
    stream: Option<SerialStream>,
    name: String,
}

impl SerialTransport {
    /// Open `port` (e.g. `/dev/ttyUSB0` or `COM3`) at `baud_rate`, 8N1.
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_config(port, &SerialConfig::with_baud_rate(baud_rate)).await
    }

    /// Open `port` with explicit line settings.
    ///
    /// Anything that stops the device from opening (missing node, permission
    /// denied, port already in use) is reported as
    /// [`Error::ChannelUnavailable`]. Bytes the radio sent before the port
    /// was opened are discarded.
    pub async fn open_with_config(port: &str, config: &SerialConfig) -> Result<Self> {
        debug!(port, ?config, "opening serial port");

        let stream = tokio_serial::new(port, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .open_native_async()
            .map_err(|e| Error::ChannelUnavailable(format!("could not open {port}: {e}")))?;

        if let Err(e) = stream.clear(ClearBuffer::All) {
            warn!(port, error = %e, "could not flush stale serial input");
        }

        info!(port, baud_rate = config.baud_rate, "serial port open");
        Ok(SerialTransport {
            stream: Some(stream),
            name: port.to_string(),
        })
    }
}

/// A vanished USB adapter shows up as a broken pipe; everything else is
/// passed through.
fn classify_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::BrokenPipe | ErrorKind::NotConnected => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        trace!(port = %self.name, data = %String::from_utf8_lossy(data).escape_debug(), "tx");

        stream.write_all(data).await.map_err(classify_io_error)?;
        stream.flush().await.map_err(classify_io_error)
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let n = tokio::time::timeout(timeout, stream.read(buf))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(classify_io_error)?;
        trace!(port = %self.name, data = %String::from_utf8_lossy(&buf[..n]).escape_debug(), "rx");
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.flush().await {
                warn!(port = %self.name, error = %e, "flush on close failed");
            }
            info!(port = %self.name, "serial port closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
