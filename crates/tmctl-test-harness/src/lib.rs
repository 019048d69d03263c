//! tmctl-test-harness: mock transports for testing tmctl without a radio.
//!
//! - [`MockTransport`] replays a strict script of request/response pairs.
//! - [`SimulatedRadio`] behaves like a TM-271A: it keeps a VFO record,
//!   memory channel and power setting, answers the command set, and can be
//!   told to answer with garbage to exercise resynchronization.

pub mod mock_serial;
pub mod sim_radio;

pub use mock_serial::MockTransport;
pub use sim_radio::SimulatedRadio;
