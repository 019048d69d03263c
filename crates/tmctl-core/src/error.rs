//! Error types for tmctl.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, protocol-layer, and
//! command-level errors are all captured here.

/// The error type for all tmctl operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The radio never echoed the command prefix within the retry budget.
    ///
    /// Fatal to the one command that was being executed, not to the session.
    #[error("no sync: radio did not acknowledge {command:?} after {attempts} attempts")]
    NoSync {
        /// The command line that was being sent (without terminator).
        command: String,
        /// How many times the command was written to the radio.
        attempts: u32,
    },

    /// The requested CTCSS tone frequency is not one the radio supports.
    #[error("unknown tone frequency: {0}")]
    UnknownTone(String),

    /// A reply from the radio did not have the expected shape.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// The serial channel could not be opened, configured, or identified.
    #[error("channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// A transport-level error (serial port configuration, write failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for data from the transport.
    #[error("timeout waiting for response")]
    Timeout,

    /// An invalid parameter was passed to a radio command.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The transport has been closed.
    #[error("not connected")]
    NotConnected,

    /// The connection to the radio was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_no_sync() {
        let e = Error::NoSync {
            command: "VM 1".into(),
            attempts: 50,
        };
        assert_eq!(
            e.to_string(),
            "no sync: radio did not acknowledge \"VM 1\" after 50 attempts"
        );
    }

    #[test]
    fn error_display_unknown_tone() {
        let e = Error::UnknownTone("99.9".into());
        assert_eq!(e.to_string(), "unknown tone frequency: 99.9");
    }

    #[test]
    fn error_display_protocol_mismatch() {
        let e = Error::ProtocolMismatch("VF record has 12 fields".into());
        assert_eq!(e.to_string(), "protocol mismatch: VF record has 12 fields");
    }

    #[test]
    fn error_display_channel_unavailable() {
        let e = Error::ChannelUnavailable("/dev/ttyUSB0: no such device".into());
        assert_eq!(
            e.to_string(),
            "channel unavailable: /dev/ttyUSB0: no such device"
        );
    }

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for response");
    }

    #[test]
    fn error_display_invalid_parameter() {
        let e = Error::InvalidParameter("memory number must be digits".into());
        assert_eq!(
            e.to_string(),
            "invalid parameter: memory number must be digits"
        );
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
