// tmctl -- command-line controller for Kenwood TM-271A/TM-281A radios.
//
// Usage:
//   tmctl mem 12
//   tmctl vfo 146940- tone 100.0
//   tmctl -vv ser /dev/ttyUSB1 vfo 0147330000+ ctcss 141.3 pow l freq
//
// Commands run in order. A command the radio rejects is reported and the
// next one still runs; an unknown word stops the script.

mod logging;
mod script;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{info, warn};

use tmctl_core::ToneMode;
use tmctl_kenwood::{Tm271Builder, Tm271Radio};

use crate::script::{Step, Steps, USAGE};

/// Port used when neither `ser` nor `TM271Aser` names one.
const DEFAULT_PORT: &str = "/dev/ttyUSB0";

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Control a Kenwood TM-271A/TM-281A over its serial port.
#[derive(Parser)]
#[command(name = "tmctl", version, about, after_help = USAGE)]
struct Cli {
    /// More logging on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Serial port, overridden by a leading `ser <port>`.
    #[arg(long, env = "TM271Aser", default_value = DEFAULT_PORT)]
    port: String,

    /// Times a command is sent before the radio is declared out of sync.
    #[arg(long, default_value_t = 50)]
    retries: u32,

    /// Milliseconds to wait for each reply.
    #[arg(long, default_value_t = 100)]
    read_timeout_ms: u64,

    /// Send `AE` after identifying the radio.
    #[arg(long)]
    announce: bool,

    /// Command words: [ser <port>] <command>...
    #[arg(trailing_var_arg = true)]
    words: Vec<String>,
}

// ---------------------------------------------------------------------------
// Script execution
// ---------------------------------------------------------------------------

enum Flow {
    Continue,
    Stop,
}

/// Run one step. Radio failures are reported on stderr and do not stop the
/// script.
async fn run_step(radio: &mut Tm271Radio, step: &Step, out: &mut impl Write) -> Result<Flow> {
    let result = match step {
        Step::Memory(mem) => radio
            .select_memory(mem)
            .await
            .map(|ch| info!(channel = %ch, "memory selected")),
        Step::Vfo(freq) => radio
            .select_vfo(freq)
            .await
            .map(|record| info!(record = %record, "VFO set")),
        Step::Tone(tone) => radio
            .set_tone(tone, ToneMode::Tone)
            .await
            .map(|record| info!(index = record.tone_index(), "tone set")),
        Step::Ctcss(tone) => radio
            .set_tone(tone, ToneMode::Ctcss)
            .await
            .map(|record| info!(index = record.tone_index(), "CTCSS set")),
        Step::Power(level) => radio
            .set_power(level)
            .await
            .map(|level| info!(%level, "power set")),
        Step::Frequency => match radio.read_frequency().await {
            Ok(freq) => {
                writeln!(out, "{freq}")?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        Step::Help => {
            write!(out, "{USAGE}")?;
            return Ok(Flow::Stop);
        }
    };

    if let Err(e) = result {
        eprintln!("{} failed: {e}", step_name(step));
    }
    Ok(Flow::Continue)
}

fn step_name(step: &Step) -> &'static str {
    match step {
        Step::Memory(_) => "mem",
        Step::Vfo(_) => "vfo",
        Step::Tone(_) => "tone",
        Step::Ctcss(_) => "ctcss",
        Step::Power(_) => "pow",
        Step::Frequency => "freq",
        Step::Help => "help",
    }
}

/// Run every step in order, stopping at `help` or at a bad word.
async fn run_script(radio: &mut Tm271Radio, words: &[String], out: &mut impl Write) -> Result<()> {
    for step in Steps::new(words) {
        if let Flow::Stop = run_step(radio, &step?, out).await? {
            break;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if cli.words.is_empty() {
        print!("{USAGE}");
        return Ok(());
    }

    let (ser_port, words) = script::split_port(&cli.words)?;
    let port = ser_port.unwrap_or(cli.port.as_str());

    let mut radio = Tm271Builder::new()
        .serial_port(port)
        .retry_budget(cli.retries)
        .read_timeout(Duration::from_millis(cli.read_timeout_ms))
        .announce(cli.announce)
        .build()
        .await
        .with_context(|| format!("Could not open: {port}"))?;

    let stdout = io::stdout();
    let result = run_script(&mut radio, words, &mut stdout.lock()).await;
    close_radio(&mut radio).await;
    result
}

/// Release the port. The script's outcome stands either way, so a failed
/// close is only logged.
async fn close_radio(radio: &mut Tm271Radio) {
    if let Err(e) = radio.close().await {
        warn!(error = %e, "could not close the radio port cleanly");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmctl_core::Transport;
    use tmctl_test_harness::{MockTransport, SimulatedRadio};

    async fn sim_radio(sim: &SimulatedRadio) -> Tm271Radio {
        Tm271Builder::new()
            .build_with_transport(Box::new(sim.clone()))
            .await
            .unwrap()
    }

    fn words(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    async fn run(sim: &SimulatedRadio, line: &str) -> (Result<()>, String) {
        let mut radio = sim_radio(sim).await;
        let mut out = Vec::new();
        let result = run_script(&mut radio, &words(line), &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn close_radio_disconnects() {
        let sim = SimulatedRadio::new();
        let mut radio = sim_radio(&sim).await;
        close_radio(&mut radio).await;
        assert!(!radio.is_connected());
        assert!(!sim.is_connected());
    }

    #[tokio::test]
    async fn close_radio_tolerates_failed_close() {
        let mut mock = MockTransport::new();
        mock.set_fail_close(true);
        let mut radio = Tm271Builder::new()
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        close_radio(&mut radio).await;
        assert!(!radio.is_connected());
    }

    #[test]
    fn cli_parses_verbosity_and_words() {
        let cli = Cli::parse_from(["tmctl", "-vv", "ser", "/dev/ttyS3", "vfo", "146940-"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.words, words("ser /dev/ttyS3 vfo 146940-"));
        assert_eq!(cli.retries, 50);
        assert!(!cli.announce);
    }

    #[tokio::test]
    async fn vfo_tone_freq_script() {
        let sim = SimulatedRadio::new();
        let (result, out) = run(&sim, "vfo 0147330000+ tone 141.3 freq").await;
        result.unwrap();
        assert_eq!(out, "147.330000\n");
        assert_eq!(
            sim.vfo_record().await,
            "0147330000,0,1,0,1,0,0,22,22,000,00600000,0,0"
        );
    }

    #[tokio::test]
    async fn failed_command_does_not_stop_script() {
        let sim = SimulatedRadio::new();
        let (result, out) = run(&sim, "tone 99.9 pow l freq").await;
        result.unwrap();
        assert_eq!(out, "145.000000\n");
        assert_eq!(sim.power().await, "2");
    }

    #[tokio::test]
    async fn help_prints_usage_and_stops() {
        let sim = SimulatedRadio::new();
        let (result, out) = run(&sim, "help freq").await;
        result.unwrap();
        assert_eq!(out, USAGE);
        assert_eq!(sim.count_received("FQ").await, 0);
    }

    #[tokio::test]
    async fn unknown_word_stops_with_error() {
        let sim = SimulatedRadio::new();
        let (result, _) = run(&sim, "mem 5 bogus pow h").await;
        assert_eq!(result.unwrap_err().to_string(), "Error input: bogus");
        assert_eq!(sim.memory_channel().await, "005");
        assert_eq!(sim.count_received("PC 0").await, 0);
    }
}
