//! Picking a backup set interactively

use std::io::{self, BufRead, Write};

use crate::error::{BackupError, BackupResult};

/// Chooses one entry from a numbered list
pub trait Selector {
    /// Returns the 1-based index picked from `options`, `default` when the
    /// operator gives no answer
    ///
    /// The index is not range-checked; callers validate it against the list.
    fn select(&mut self, options: &[String], default: usize) -> BackupResult<usize>;
}

/// Selector that prints the list and reads the answer from a line of input
pub struct PromptSelector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptSelector<io::StdinLock<'static>, io::Stdout> {
    /// Selector reading from standard input
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Selector for PromptSelector<R, W> {
    fn select(&mut self, options: &[String], default: usize) -> BackupResult<usize> {
        for line in numbered_lines(options) {
            writeln!(self.output, "{}", line)?;
        }
        write!(
            self.output,
            "Enter the number of the backup to restore [default is {}]: ",
            default
        )?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;

        parse_choice(&answer, default)
    }
}

/// `1. name` lines, as shown by `list` and the restore prompt
pub fn numbered_lines(options: &[String]) -> Vec<String> {
    options
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect()
}

/// Parse an answer to the prompt; blank means `default`
pub fn parse_choice(answer: &str, default: usize) -> BackupResult<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default);
    }

    answer
        .parse()
        .map_err(|_| BackupError::InvalidSelection(answer.to_string()))
}
