//! Tm271Radio -- user-level operations on a TM-271A/TM-281A.
//!
//! Each operation is a short sequence of transactions. Operations that change
//! VFO settings read the current `VF` record, patch only the fields they own,
//! and write the record back, so settings this program does not model (step,
//! offset, narrow, ...) survive untouched.
//!
//! Arguments are validated before anything is sent. A rejected argument never
//! costs a round trip and never leaves the radio half-configured.

use tracing::{debug, info};

use tmctl_core::error::{Error, Result};
use tmctl_core::helpers::format_freq_mhz;
use tmctl_core::types::{ChannelMode, PowerLevel, ToneMode};

use crate::channel::LineChannel;
use crate::commands;
use crate::record::{VfoField, VfoRecord};
use crate::tones::{self, NO_TONE_INDEX};
use crate::transaction::{EngineConfig, Exchange, TransactionEngine};

/// Tone argument that turns subaudible tones off.
pub const TONE_OFF: &str = "0";

/// A connected TM-271A/TM-281A.
///
/// Constructed via [`Tm271Builder`](crate::builder::Tm271Builder). Every
/// operation takes `&mut self`; the radio owns its link exclusively.
pub struct Tm271Radio {
    engine: TransactionEngine,
    model: Option<String>,
}

impl Tm271Radio {
    pub(crate) fn new(channel: LineChannel, config: EngineConfig) -> Self {
        Tm271Radio {
            engine: TransactionEngine::new(channel, config),
            model: None,
        }
    }

    /// Model string reported by the last successful [`identify`](Self::identify).
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn engine_config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// Send a raw command line and return the acknowledging reply.
    pub async fn execute(&mut self, line: &str) -> Result<String> {
        self.engine.execute(line).await
    }

    /// Like [`execute`](Self::execute), also reporting the attempt count.
    pub async fn exchange(&mut self, line: &str) -> Result<Exchange> {
        self.engine.exchange(line).await
    }

    /// Ask the radio for its model (`ID`).
    pub async fn identify(&mut self) -> Result<String> {
        let reply = self.engine.execute(&commands::cmd_identify()).await?;
        let model = commands::parse_identify_response(&reply);
        info!(model = %model, "radio identified");
        self.model = Some(model.clone());
        Ok(model)
    }

    /// Send the `AE` enable command.
    pub async fn announce(&mut self) -> Result<()> {
        self.engine.execute(&commands::cmd_announce()).await?;
        Ok(())
    }

    /// Switch to memory mode and recall a channel.
    ///
    /// The number is normalized to three digits: `7` recalls `007`, and
    /// `1033` recalls `033`. Returns the channel actually recalled.
    pub async fn select_memory(&mut self, mem: &str) -> Result<String> {
        let channel = commands::normalize_memory_number(mem)?;

        self.engine
            .execute(&commands::cmd_select_mode(ChannelMode::Memory))
            .await?;
        self.engine
            .execute(&commands::cmd_recall_memory(&channel))
            .await?;

        debug!(channel = %channel, "memory channel selected");
        Ok(channel)
    }

    /// Switch to VFO mode and tune to `arg`, e.g. `147330+`.
    ///
    /// A trailing `+` or `-` selects the repeater shift; no suffix means
    /// simplex. Retuning clears the tone, CTCSS and DCS enables. Returns the
    /// record as committed.
    pub async fn select_vfo(&mut self, arg: &str) -> Result<VfoRecord> {
        let (freq, shift) = commands::parse_vfo_argument(arg)?;

        self.engine
            .execute(&commands::cmd_select_mode(ChannelMode::Vfo))
            .await?;
        let record = self.read_record().await?;
        let patched = record.patch(&[
            (VfoField::Frequency, freq.as_str()),
            (VfoField::Shift, shift.code()),
            (VfoField::ToneEnable, "0"),
            (VfoField::CtcssEnable, "0"),
            (VfoField::DcsEnable, "0"),
        ])?;
        self.commit_record(&patched).await?;

        if let Ok(hz) = patched.frequency_hz() {
            debug!(frequency = %format_freq_mhz(hz), %shift, "VFO tuned");
        }
        Ok(patched)
    }

    /// Set the subaudible tone on the current VFO.
    ///
    /// `tone` is a canonical tone frequency such as `"141.3"`, or
    /// [`TONE_OFF`] to disable tones. The same index is written to both the
    /// encode and decode fields. An unknown tone fails with
    /// [`Error::UnknownTone`] before the radio is touched.
    pub async fn set_tone(&mut self, tone: &str, mode: ToneMode) -> Result<VfoRecord> {
        let (tone_flag, ctcss_flag, index) = if tone == TONE_OFF {
            ("0", "0", NO_TONE_INDEX)
        } else {
            let index = tones::tone_index(tone)?;
            let (tone_flag, ctcss_flag) = mode.enable_flags();
            (tone_flag, ctcss_flag, index)
        };

        let record = self.read_record().await?;
        let patched = record.patch(&[
            (VfoField::ToneEnable, tone_flag),
            (VfoField::CtcssEnable, ctcss_flag),
            (VfoField::DcsEnable, "0"),
            (VfoField::EncodeTone, index),
            (VfoField::DecodeTone, index),
        ])?;
        self.commit_record(&patched).await?;

        debug!(tone, %mode, index, "tone set");
        Ok(patched)
    }

    /// Set transmit power from a user word (`high`, `l`, `Low`, ...).
    pub async fn set_power(&mut self, level: &str) -> Result<PowerLevel> {
        let level: PowerLevel = level
            .parse()
            .map_err(|e| Error::InvalidParameter(format!("{e}")))?;
        self.set_power_level(level).await?;
        Ok(level)
    }

    pub async fn set_power_level(&mut self, level: PowerLevel) -> Result<()> {
        self.engine.execute(&commands::cmd_set_power(level)).await?;
        debug!(%level, "power set");
        Ok(())
    }

    /// Read the displayed frequency as `MHz.kHz`, e.g. `147.330000`.
    pub async fn read_frequency(&mut self) -> Result<String> {
        let reply = self
            .engine
            .execute(&commands::cmd_read_frequency())
            .await?;
        commands::parse_frequency_response(&reply)
    }

    /// Read and parse the current VFO record.
    pub async fn read_record(&mut self) -> Result<VfoRecord> {
        let reply = self.engine.execute(&commands::cmd_read_vfo()).await?;
        VfoRecord::parse(&reply)
    }

    /// Write a record back to the radio.
    pub async fn commit_record(&mut self, record: &VfoRecord) -> Result<String> {
        self.engine.execute(&record.to_command()).await
    }

    /// Close the link to the radio.
    pub async fn close(&mut self) -> Result<()> {
        self.engine.close().await
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_connected()
    }
}
