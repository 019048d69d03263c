//! A stateful fake TM-271A for end-to-end tests.
//!
//! [`SimulatedRadio`] implements [`Transport`] by parsing every
//! carriage-return terminated line it is sent and queueing the reply a real
//! radio would produce. Clones share state, so a test can hand one clone to
//! the radio driver and keep another to inspect what the driver did.
//!
//! ```
//! use tmctl_test_harness::SimulatedRadio;
//!
//! let sim = SimulatedRadio::new();
//! let observer = sim.clone();
//! // Box::new(sim) goes to the code under test; `observer` stays here.
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

use tmctl_core::error::{Error, Result};
use tmctl_core::transport::Transport;

/// Record body the simulator powers up with (everything after `VF `).
pub const DEFAULT_VFO_RECORD: &str = "0145000000,0,0,0,0,0,0,08,08,000,00600000,0,0";

/// Model string returned by `ID`.
pub const DEFAULT_MODEL: &str = "TM-271";

const VF_FIELDS: usize = 13;

/// Replies used in turn when the simulator is told to misbehave.
const GARBAGE: &[&str] = &["?", "E", "0,0", ""];

#[derive(Debug)]
struct SimState {
    model: String,
    memory_mode: bool,
    memory_channel: String,
    vfo_record: String,
    power: String,
    garbage_replies: u32,
    garbage_cursor: usize,
    line_buf: Vec<u8>,
    outbound: VecDeque<u8>,
    received: Vec<String>,
    connected: bool,
}

impl SimState {
    fn handle_line(&mut self, line: &str) {
        self.received.push(line.to_string());

        if line.is_empty() {
            // A bare terminator aborts whatever the radio was parsing.
            self.queue("?");
            return;
        }

        if self.garbage_replies > 0 {
            self.garbage_replies -= 1;
            let junk = GARBAGE[self.garbage_cursor % GARBAGE.len()];
            self.garbage_cursor += 1;
            trace!(line, junk, "simulated radio garbling reply");
            if !junk.is_empty() {
                self.queue(junk);
            }
            return;
        }

        let reply = self.execute(line);
        self.queue(&reply);
    }

    fn execute(&mut self, line: &str) -> String {
        let (mnemonic, params) = match line.split_once(' ') {
            Some((m, p)) => (m, Some(p)),
            None => (line, None),
        };

        match (mnemonic, params) {
            ("ID", None) => format!("ID {}", self.model),
            ("AE", None) => "AE".to_string(),
            ("VM", None) => format!("VM {}", if self.memory_mode { 1 } else { 0 }),
            ("VM", Some("0")) => {
                self.memory_mode = false;
                "VM 0".to_string()
            }
            ("VM", Some("1")) => {
                self.memory_mode = true;
                "VM 1".to_string()
            }
            ("MR", Some(ch)) if self.memory_mode && is_digits(ch, 3) => {
                self.memory_channel = ch.to_string();
                format!("MR {ch}")
            }
            ("VF", None) => format!("VF {}", self.vfo_record),
            ("VF", Some(record)) if record.split(',').count() == VF_FIELDS => {
                self.vfo_record = record.to_string();
                format!("VF {record}")
            }
            ("FQ", None) => {
                let mut fields = self.vfo_record.split(',');
                let freq = fields.next().unwrap_or_default();
                let step = fields.next().unwrap_or_default();
                format!("FQ {freq},{step}")
            }
            ("PC", None) => format!("PC {}", self.power),
            ("PC", Some(level)) if matches!(level, "0" | "1" | "2") => {
                self.power = level.to_string();
                format!("PC {level}")
            }
            _ => "?".to_string(),
        }
    }

    fn queue(&mut self, reply: &str) {
        self.outbound.extend(reply.as_bytes());
        self.outbound.push_back(b'\r');
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// A simulated TM-271A reachable through the [`Transport`] trait.
#[derive(Debug, Clone)]
pub struct SimulatedRadio {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedRadio {
    /// A radio in VFO mode holding [`DEFAULT_VFO_RECORD`].
    pub fn new() -> Self {
        Self::with_record(DEFAULT_VFO_RECORD)
    }

    /// A radio in VFO mode holding the given record body (without `VF `).
    pub fn with_record(record: &str) -> Self {
        SimulatedRadio {
            state: Arc::new(Mutex::new(SimState {
                model: DEFAULT_MODEL.to_string(),
                memory_mode: false,
                memory_channel: "000".to_string(),
                vfo_record: record.to_string(),
                power: "0".to_string(),
                garbage_replies: 0,
                garbage_cursor: 0,
                line_buf: Vec::new(),
                outbound: VecDeque::new(),
                received: Vec::new(),
                connected: true,
            })),
        }
    }

    /// Answer the next `n` command lines with garbage and ignore them.
    pub async fn garble_next(&self, n: u32) {
        self.state.lock().await.garbage_replies = n;
    }

    /// Queue unsolicited bytes, as if left over from an earlier exchange.
    pub async fn inject(&self, bytes: &[u8]) {
        self.state.lock().await.outbound.extend(bytes.iter().copied());
    }

    /// Current VFO record body (without `VF `).
    pub async fn vfo_record(&self) -> String {
        self.state.lock().await.vfo_record.clone()
    }

    /// Whether memory mode is selected.
    pub async fn memory_mode(&self) -> bool {
        self.state.lock().await.memory_mode
    }

    /// The last recalled memory channel.
    pub async fn memory_channel(&self) -> String {
        self.state.lock().await.memory_channel.clone()
    }

    /// The `PC` power code currently set.
    pub async fn power(&self) -> String {
        self.state.lock().await.power.clone()
    }

    /// Every line received so far, without terminators. Bare terminators
    /// show up as empty strings.
    pub async fn received_lines(&self) -> Vec<String> {
        self.state.lock().await.received.clone()
    }

    /// How many times `line` was received.
    pub async fn count_received(&self, line: &str) -> usize {
        self.state
            .lock()
            .await
            .received
            .iter()
            .filter(|l| l.as_str() == line)
            .count()
    }
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SimulatedRadio {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.connected {
            return Err(Error::NotConnected);
        }

        for &byte in data {
            if byte == b'\r' {
                let raw = std::mem::take(&mut state.line_buf);
                let line = String::from_utf8_lossy(&raw).into_owned();
                state.handle_line(&line);
            } else {
                state.line_buf.push(byte);
            }
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        let mut state = self.state.lock().await;
        if !state.connected {
            return Err(Error::NotConnected);
        }
        if state.outbound.is_empty() {
            return Err(Error::Timeout);
        }

        let n = state.outbound.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(state.outbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.connected = false;
        state.outbound.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state
            .try_lock()
            .map(|state| state.connected)
            .unwrap_or(true)
    }
}
