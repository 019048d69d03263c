//! Formatting helpers for frequencies.

/// Format a frequency in hertz as a human-readable MHz string.
///
/// Returns a string like `"147.330000 MHz"` with six decimal places, the
/// display precision of the radio.
///
/// # Example
///
/// ```
/// use tmctl_core::format_freq_mhz;
///
/// assert_eq!(format_freq_mhz(147_330_000), "147.330000 MHz");
/// assert_eq!(format_freq_mhz(446_006_250), "446.006250 MHz");
/// ```
pub fn format_freq_mhz(freq_hz: u64) -> String {
    format!("{}.{:06} MHz", freq_hz / 1_000_000, freq_hz % 1_000_000)
}
