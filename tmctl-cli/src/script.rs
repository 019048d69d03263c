// Command-word parsing for tmctl.
//
// The command line is a small script: an optional `ser <port>` followed by
// any number of commands, each a keyword and at most one argument. Steps are
// produced lazily so that everything before a bad word still runs.

use anyhow::{Result, anyhow};

pub const USAGE: &str = "\
Usage: tmctl [-v[v...]] [ser <port>] <command>...

Commands:
  ser <port>
      Serial port to use, e.g. \"ser COM3\" or \"ser /dev/ttyUSB1\".
      Must be the first command if used. The environment variable
      TM271Aser, if set, gives the default port.
  mem <nnn>
      Recall memory channel nnn (up to 3 digits).
  vfo <frequency>[+|-]
      Tune the VFO. The frequency is given in Hz, up to 10 digits;
      a trailing + or - selects the repeater offset direction.
      This clears any tone setting, so set the tone afterwards.
  tone <xxx.x>
      Transmit a CTCSS tone, e.g. \"tone 141.3\". Must be one of the
      42 standard tones exactly; \"tone 0\" turns tones off.
  ctcss <xxx.x>
      Require a CTCSS tone on receive (tone squelch).
  pow <h|l>
      Set transmit power to high or low.
  freq
      Print the displayed frequency in MHz.
  help
      Print this text.
";

/// One command from the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Memory(String),
    Vfo(String),
    Tone(String),
    Ctcss(String),
    Power(String),
    Frequency,
    Help,
}

/// Split off a leading `ser <port>` pair.
///
/// Returns the port, if one was given, and the remaining words. A `ser`
/// anywhere else is an ordinary (unknown) word.
pub fn split_port(words: &[String]) -> Result<(Option<&str>, &[String])> {
    match words.first() {
        Some(word) if word.eq_ignore_ascii_case("ser") => match words.get(1) {
            Some(port) => Ok((Some(port.as_str()), &words[2..])),
            None => Err(anyhow!("missing argument for `ser`")),
        },
        _ => Ok((None, words)),
    }
}

/// Iterator over the steps of a script.
///
/// Yields one error for an unknown word or a missing argument and then
/// stops.
pub struct Steps<'a> {
    words: std::slice::Iter<'a, String>,
    halted: bool,
}

impl<'a> Steps<'a> {
    pub fn new(words: &'a [String]) -> Self {
        Steps {
            words: words.iter(),
            halted: false,
        }
    }

    fn argument(&mut self, keyword: &str) -> Result<String> {
        self.words
            .next()
            .cloned()
            .ok_or_else(|| anyhow!("missing argument for `{keyword}`"))
    }

    fn parse_word(&mut self, word: &str) -> Result<Step> {
        let lower = word.to_ascii_lowercase();
        let step = match lower.as_str() {
            "mem" => Step::Memory(self.argument(&lower)?),
            "vfo" => Step::Vfo(self.argument(&lower)?),
            "tone" => Step::Tone(self.argument(&lower)?),
            "ctcss" => Step::Ctcss(self.argument(&lower)?),
            "help" => Step::Help,
            w if w.starts_with("pow") => Step::Power(self.argument("pow")?),
            w if w.starts_with("freq") => Step::Frequency,
            _ => return Err(anyhow!("Error input: {word}")),
        };
        Ok(step)
    }
}

impl Iterator for Steps<'_> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let word = self.words.next()?;
        let step = self.parse_word(word);
        if step.is_err() {
            self.halted = true;
        }
        Some(step)
    }
}
