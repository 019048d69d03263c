//! The `VF` VFO configuration record.
//!
//! The radio reports and accepts its VFO state as one comma-separated line:
//!
//! ```text
//! VF 0147330000,0,0,0,1,0,0,13,13,056,00600000,0,0
//!    freq      step shift rev tone ctcss dcs enc dec dcs-code offset narrow beat
//! ```
//!
//! Not every field is understood, so a record is never built from scratch.
//! It is read from the radio, patched field by field, and written back; a
//! patch leaves every untouched field byte-identical to what was read.

use std::fmt;
use std::ops::Range;

use tmctl_core::error::{Error, Result};
use tmctl_core::types::Shift;

/// Mnemonic and separator that start every record line.
pub const RECORD_HEADER: &str = "VF ";

/// Number of comma-separated fields in a record.
pub const FIELD_COUNT: usize = 13;

/// Width of the frequency field in digits.
pub const FREQUENCY_DIGITS: usize = 10;

/// Fields of the `VF` record, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VfoField {
    Frequency,
    Step,
    Shift,
    Reverse,
    ToneEnable,
    CtcssEnable,
    DcsEnable,
    EncodeTone,
    DecodeTone,
    DcsCode,
    Offset,
    Narrow,
    BeatShift,
}

impl VfoField {
    /// All fields in wire order.
    pub const ALL: [VfoField; FIELD_COUNT] = [
        VfoField::Frequency,
        VfoField::Step,
        VfoField::Shift,
        VfoField::Reverse,
        VfoField::ToneEnable,
        VfoField::CtcssEnable,
        VfoField::DcsEnable,
        VfoField::EncodeTone,
        VfoField::DecodeTone,
        VfoField::DcsCode,
        VfoField::Offset,
        VfoField::Narrow,
        VfoField::BeatShift,
    ];

    /// Position of the field in the comma-separated list.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            VfoField::Frequency => "frequency",
            VfoField::Step => "step",
            VfoField::Shift => "shift",
            VfoField::Reverse => "reverse",
            VfoField::ToneEnable => "tone",
            VfoField::CtcssEnable => "ctcss",
            VfoField::DcsEnable => "dcs",
            VfoField::EncodeTone => "encode tone",
            VfoField::DecodeTone => "decode tone",
            VfoField::DcsCode => "dcs code",
            VfoField::Offset => "offset",
            VfoField::Narrow => "narrow",
            VfoField::BeatShift => "beat shift",
        }
    }
}

impl fmt::Display for VfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A VFO record as read from the radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfoRecord {
    fields: Vec<String>,
}

impl VfoRecord {
    /// Parse a `VF` reply line (terminator already stripped).
    ///
    /// Fails with [`Error::ProtocolMismatch`] if the line does not start with
    /// `VF `, does not hold exactly [`FIELD_COUNT`] fields, or carries
    /// anything but printable ASCII. Line noise that was not valid UTF-8 has
    /// already been replaced by U+FFFD, and writing that back would not
    /// reproduce the bytes the radio sent.
    pub fn parse(reply: &str) -> Result<Self> {
        if let Some(bad) = reply.chars().find(|c| !(' '..='~').contains(c)) {
            return Err(Error::ProtocolMismatch(format!(
                "VF reply contains non-printable character {bad:?}: {reply:?}"
            )));
        }

        let body = reply.strip_prefix(RECORD_HEADER).ok_or_else(|| {
            Error::ProtocolMismatch(format!("VF reply without record header: {reply:?}"))
        })?;

        let fields: Vec<String> = body.split(',').map(str::to_string).collect();
        if fields.len() != FIELD_COUNT {
            return Err(Error::ProtocolMismatch(format!(
                "VF record has {} fields, expected {FIELD_COUNT}: {reply:?}",
                fields.len()
            )));
        }

        Ok(VfoRecord { fields })
    }

    /// Raw text of one field.
    pub fn field(&self, field: VfoField) -> &str {
        &self.fields[field.index()]
    }

    /// Return a copy with the given fields replaced.
    ///
    /// Edits are applied in order by field index against this record, so an
    /// edit that changes a field's width never shifts another edit. If a
    /// field is edited twice the last value wins. Values may not contain the
    /// field separator or the line terminator.
    pub fn patch(&self, edits: &[(VfoField, &str)]) -> Result<VfoRecord> {
        let mut patched = self.clone();
        for &(field, value) in edits {
            if value.contains(|c: char| c == ',' || c == '\r') {
                return Err(Error::InvalidParameter(format!(
                    "{field} value may not contain ',' or CR: {value:?}"
                )));
            }
            patched.fields[field.index()] = value.to_string();
        }
        Ok(patched)
    }

    /// The full command line that writes this record back to the radio.
    pub fn to_command(&self) -> String {
        format!("{RECORD_HEADER}{}", self.fields.join(","))
    }

    /// Byte range the field occupies in [`to_command`](Self::to_command).
    pub fn span(&self, field: VfoField) -> Range<usize> {
        let start = RECORD_HEADER.len()
            + self.fields[..field.index()]
                .iter()
                .map(|f| f.len() + 1)
                .sum::<usize>();
        start..start + self.fields[field.index()].len()
    }

    /// Frequency in hertz.
    pub fn frequency_hz(&self) -> Result<u64> {
        let raw = self.field(VfoField::Frequency);
        raw.parse().map_err(|_| {
            Error::ProtocolMismatch(format!("VF frequency field is not numeric: {raw:?}"))
        })
    }

    /// Repeater shift, or `None` for a code this program does not know.
    pub fn shift(&self) -> Option<Shift> {
        Shift::from_code(self.field(VfoField::Shift))
    }

    pub fn tone_enabled(&self) -> bool {
        self.field(VfoField::ToneEnable) == "1"
    }

    pub fn ctcss_enabled(&self) -> bool {
        self.field(VfoField::CtcssEnable) == "1"
    }

    /// The encode tone index (`"00"`..`"41"`).
    pub fn tone_index(&self) -> &str {
        self.field(VfoField::EncodeTone)
    }
}

impl fmt::Display for VfoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "VF 0147330000,0,0,0,1,0,0,13,13,056,00600000,0,0";

    fn sample() -> VfoRecord {
        VfoRecord::parse(SAMPLE).unwrap()
    }

    // ---------------------------------------------------------------
    // Parsing
    // ---------------------------------------------------------------

    #[test]
    fn parse_reads_every_field() {
        let record = sample();
        assert_eq!(record.field(VfoField::Frequency), "0147330000");
        assert_eq!(record.field(VfoField::Step), "0");
        assert_eq!(record.field(VfoField::ToneEnable), "1");
        assert_eq!(record.field(VfoField::EncodeTone), "13");
        assert_eq!(record.field(VfoField::DecodeTone), "13");
        assert_eq!(record.field(VfoField::DcsCode), "056");
        assert_eq!(record.field(VfoField::Offset), "00600000");
        assert_eq!(record.field(VfoField::BeatShift), "0");
    }

    #[test]
    fn parse_round_trips_bytes() {
        assert_eq!(sample().to_command(), SAMPLE);
    }

    #[test]
    fn parse_rejects_missing_header() {
        let err = VfoRecord::parse("0147330000,0,0,0,1,0,0,13,13,056,00600000,0,0").unwrap_err();
        assert!(matches!(err, Error::ProtocolMismatch(_)));
    }

    #[test]
    fn parse_rejects_truncated_record() {
        let err = VfoRecord::parse("VF 0147330000,0,0,0,1,0").unwrap_err();
        assert!(matches!(err, Error::ProtocolMismatch(_)));
    }

    #[test]
    fn parse_rejects_extra_fields() {
        let line = format!("{SAMPLE},0");
        assert!(matches!(
            VfoRecord::parse(&line),
            Err(Error::ProtocolMismatch(_))
        ));
    }

    #[test]
    fn parse_rejects_replacement_character() {
        let noisy = String::from_utf8_lossy(b"VF 0147330000,0,0,0,1,0,0,13,13,056,006\xFF0000,0,0");
        assert!(matches!(
            VfoRecord::parse(&noisy),
            Err(Error::ProtocolMismatch(_))
        ));
    }

    #[test]
    fn parse_rejects_control_characters() {
        let line = "VF 0147330000,0,0,0,1,0,0,13,13,056,006\u{7}0000,0,0";
        assert!(matches!(
            VfoRecord::parse(line),
            Err(Error::ProtocolMismatch(_))
        ));
    }

    #[test]
    fn parse_rejects_error_token() {
        assert!(VfoRecord::parse("?").is_err());
    }

    // ---------------------------------------------------------------
    // Patching
    // ---------------------------------------------------------------

    #[test]
    fn patch_leaves_other_fields_byte_identical() {
        let original = sample();
        for target in VfoField::ALL {
            let patched = original.patch(&[(target, "X")]).unwrap();
            assert_eq!(patched.field(target), "X");
            for other in VfoField::ALL.into_iter().filter(|f| *f != target) {
                assert_eq!(patched.field(other), original.field(other), "{other} changed");
            }
        }
    }

    #[test]
    fn patch_preserves_untouched_wire_bytes() {
        let original = sample();
        let patched = original.patch(&[(VfoField::Shift, "1")]).unwrap();
        let before = original.to_command();
        let after = patched.to_command();
        let span = original.span(VfoField::Shift);
        assert_eq!(before[..span.start], after[..span.start]);
        assert_eq!(before[span.end..], after[span.end..]);
        assert_eq!(&after[span], "1");
    }

    #[test]
    fn patch_width_change_does_not_shift_later_edits() {
        let patched = sample()
            .patch(&[(VfoField::Step, "10"), (VfoField::EncodeTone, "22")])
            .unwrap();
        assert_eq!(
            patched.to_command(),
            "VF 0147330000,10,0,0,1,0,0,22,13,056,00600000,0,0"
        );
    }

    #[test]
    fn patch_last_edit_wins() {
        let patched = sample()
            .patch(&[(VfoField::Shift, "1"), (VfoField::Shift, "2")])
            .unwrap();
        assert_eq!(patched.field(VfoField::Shift), "2");
    }

    #[test]
    fn patch_does_not_modify_original() {
        let original = sample();
        let _ = original.patch(&[(VfoField::Frequency, "0446000000")]).unwrap();
        assert_eq!(original.to_command(), SAMPLE);
    }

    #[test]
    fn patch_rejects_separator_in_value() {
        assert!(matches!(
            sample().patch(&[(VfoField::Offset, "0,0")]),
            Err(Error::InvalidParameter(_))
        ));
    }

    // ---------------------------------------------------------------
    // Spans and accessors
    // ---------------------------------------------------------------

    #[test]
    fn spans_match_legacy_byte_offsets() {
        let record = sample();
        assert_eq!(record.span(VfoField::Frequency), 3..13);
        assert_eq!(record.span(VfoField::Step), 14..15);
        assert_eq!(record.span(VfoField::Shift), 16..17);
        assert_eq!(record.span(VfoField::ToneEnable), 20..21);
        assert_eq!(record.span(VfoField::EncodeTone), 26..28);
        assert_eq!(record.span(VfoField::DecodeTone), 29..31);
        assert_eq!(record.span(VfoField::Offset), 36..44);
    }

    #[test]
    fn typed_accessors() {
        let record = sample();
        assert_eq!(record.frequency_hz().unwrap(), 147_330_000);
        assert_eq!(record.shift(), Some(Shift::Simplex));
        assert!(record.tone_enabled());
        assert!(!record.ctcss_enabled());
        assert_eq!(record.tone_index(), "13");
    }

    #[test]
    fn non_numeric_frequency_is_protocol_mismatch() {
        let record = sample()
            .patch(&[(VfoField::Frequency, "01473x0000")])
            .unwrap();
        assert!(matches!(
            record.frequency_hz(),
            Err(Error::ProtocolMismatch(_))
        ));
    }

    #[test]
    fn display_is_wire_format() {
        assert_eq!(sample().to_string(), SAMPLE);
    }
}
