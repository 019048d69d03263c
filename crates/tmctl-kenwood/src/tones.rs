//! CTCSS tone table.
//!
//! The radio addresses subaudible tones by a two-digit index into the
//! standard 42-tone CTCSS set. Tones are looked up by their canonical decimal
//! spelling (`"100.0"`, not `"100"`), exactly as printed on the radio.

use tmctl_core::error::{Error, Result};

/// Number of tones the radio supports.
pub const TONE_COUNT: usize = 42;

/// Index sent for "no tone".
pub const NO_TONE_INDEX: &str = "00";

/// Tone frequency to radio index, in index order.
pub const CTCSS_TONES: [(&str, &str); TONE_COUNT] = [
    ("67.0", "00"),
    ("69.3", "01"),
    ("71.9", "02"),
    ("74.4", "03"),
    ("77.0", "04"),
    ("79.7", "05"),
    ("82.5", "06"),
    ("85.4", "07"),
    ("88.5", "08"),
    ("91.5", "09"),
    ("94.8", "10"),
    ("97.4", "11"),
    ("100.0", "12"),
    ("103.5", "13"),
    ("107.2", "14"),
    ("110.9", "15"),
    ("114.8", "16"),
    ("118.8", "17"),
    ("123.0", "18"),
    ("127.3", "19"),
    ("131.8", "20"),
    ("136.5", "21"),
    ("141.3", "22"),
    ("146.2", "23"),
    ("151.4", "24"),
    ("156.7", "25"),
    ("162.2", "26"),
    ("167.9", "27"),
    ("173.8", "28"),
    ("179.9", "29"),
    ("186.2", "30"),
    ("192.8", "31"),
    ("203.5", "32"),
    ("206.5", "33"),
    ("210.7", "34"),
    ("218.1", "35"),
    ("225.7", "36"),
    ("229.1", "37"),
    ("233.6", "38"),
    ("241.8", "39"),
    ("250.3", "40"),
    ("254.1", "41"),
];

/// Look up the radio index for a tone frequency.
///
/// Fails with [`Error::UnknownTone`] for anything not in the table; there is
/// no nearest-match fallback.
///
/// ```
/// use tmctl_kenwood::tones::tone_index;
///
/// assert_eq!(tone_index("141.3").unwrap(), "22");
/// assert!(tone_index("141.2").is_err());
/// ```
pub fn tone_index(freq: &str) -> Result<&'static str> {
    CTCSS_TONES
        .iter()
        .find(|(tone, _)| *tone == freq)
        .map(|(_, index)| *index)
        .ok_or_else(|| Error::UnknownTone(freq.to_string()))
}

/// Reverse lookup: the tone frequency for a radio index.
pub fn tone_frequency(index: &str) -> Option<&'static str> {
    CTCSS_TONES
        .iter()
        .find(|(_, idx)| *idx == index)
        .map(|(tone, _)| *tone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_42_sequential_indices() {
        assert_eq!(CTCSS_TONES.len(), 42);
        for (i, (_, index)) in CTCSS_TONES.iter().enumerate() {
            assert_eq!(*index, format!("{i:02}"));
        }
    }

    #[test]
    fn table_frequencies_are_ascending() {
        let freqs: Vec<f64> = CTCSS_TONES
            .iter()
            .map(|(tone, _)| tone.parse().unwrap())
            .collect();
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn lookup_known_tones() {
        assert_eq!(tone_index("67.0").unwrap(), "00");
        assert_eq!(tone_index("100.0").unwrap(), "12");
        assert_eq!(tone_index("141.3").unwrap(), "22");
        assert_eq!(tone_index("254.1").unwrap(), "41");
    }

    #[test]
    fn lookup_unknown_tone_fails() {
        match tone_index("99.9") {
            Err(Error::UnknownTone(t)) => assert_eq!(t, "99.9"),
            other => panic!("expected UnknownTone, got {other:?}"),
        }
    }

    #[test]
    fn lookup_requires_canonical_spelling() {
        assert!(tone_index("100").is_err());
        assert!(tone_index("100.00").is_err());
        assert!(tone_index(" 100.0").is_err());
    }

    #[test]
    fn reverse_lookup() {
        assert_eq!(tone_frequency("22"), Some("141.3"));
        assert_eq!(tone_frequency("00"), Some("67.0"));
        assert_eq!(tone_frequency("42"), None);
    }
}
