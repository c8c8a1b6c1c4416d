//! Terminal prompter.

use std::io::{self, BufRead, Write};
use tracing::warn;

use super::{PromptError, Prompter};

/// Prompter reading lines from `input` and writing to `output`.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "{} ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn tell(&mut self, message: &str) {
        if let Err(error) = writeln!(self.output, "{}", message) {
            warn!(%error, "could not write to the console");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_lines_and_writes_prompts() {
        let mut console = ConsolePrompter::new(Cursor::new("pasta, uova\r\n30\n"), Vec::new());

        assert_eq!(console.read_line("Ingredients?").unwrap(), "pasta, uova");
        console.tell("Thanks.");
        assert_eq!(console.read_line("Minutes?").unwrap(), "30");

        let written = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(written, "Ingredients? Thanks.\nMinutes? ");
    }

    #[test]
    fn test_end_of_input_is_closed() {
        let mut console = ConsolePrompter::new(Cursor::new(""), Vec::new());
        assert!(matches!(console.read_line("Anything?"), Err(PromptError::Closed)));
    }
}
