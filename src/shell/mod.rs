//! Interactive input processor.
//!
//! Drives one read-evaluate cycle per input line: obtain a line from the
//! line-source collaborator, trim the terminator, detect the `?` help
//! sentinel, run the matching engine against the active tree, and render
//! the outcome on the caller-supplied output and error streams. EOF from
//! the source ends the loop cleanly.

pub mod formatting;

#[cfg(test)]
mod tests;

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::Result;
use crate::engine::{HelpOutcome, Outcome};
use crate::grammar::TreeId;
use crate::session::Session;

use self::formatting::{format_caret, format_error, format_help};

/// Errors raised by the input processor.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Reading from the line source or writing a stream failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Line-input collaborator. Blocking happens here, outside the core;
/// `Ok(None)` signals end of input.
pub trait LineSource {
    /// Produces the next input line, terminator included or not; the
    /// shell trims trailing `\r\n` itself.
    ///
    /// # Errors
    /// Returns an IO error if the underlying source fails.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Reads lines from standard input.
#[derive(Debug, Default)]
pub struct StdinSource;

impl LineSource for StdinSource {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Reads lines from a fixed script; useful for tests and batch input.
#[derive(Debug)]
pub struct ScriptSource {
    lines: std::vec::IntoIter<String>,
}

impl ScriptSource {
    /// Creates a source that yields each given line once, then EOF.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(Into::into)
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

impl LineSource for ScriptSource {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.next())
    }
}

/// Result of one read-evaluate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// A command line was evaluated to this outcome; side effects for a
    /// complete command have already been applied.
    Evaluated(Outcome),
    /// A blank line or help enumeration; nothing was evaluated.
    Skipped,
    /// The line source is exhausted.
    Eof,
}

/// The interactive shell around one session and one active tree.
pub struct Shell<R, W, E> {
    source: R,
    out: W,
    err: E,
    prompt: String,
}

impl<R, W, E> Shell<R, W, E>
where
    R: LineSource,
    W: Write,
    E: Write,
{
    /// Creates a shell over a line source and two output streams.
    pub fn new(source: R, out: W, err: E) -> Self {
        Self {
            source,
            out,
            err,
            prompt: "> ".to_string(),
        }
    }

    /// Replaces the prompt string.
    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }

    /// Changes the prompt on a running shell.
    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
    }

    /// Runs read-evaluate cycles until EOF.
    ///
    /// # Errors
    /// Returns IO failures from the collaborators and structural engine
    /// errors; grammar-level rejections are rendered, not returned.
    pub fn run(&mut self, session: &mut Session, tree: TreeId) -> Result<()> {
        info!(tree = session.tree(tree)?.name(), "entering shell loop");
        while self.process_line(session, tree)? != Cycle::Eof {}
        Ok(())
    }

    /// Executes one read-evaluate cycle.
    ///
    /// # Errors
    /// Returns IO failures from the collaborators and structural engine
    /// errors; grammar-level rejections are rendered, not returned.
    pub fn process_line(&mut self, session: &mut Session, tree: TreeId) -> Result<Cycle> {
        write!(self.out, "{}", self.prompt).map_err(ShellError::Io)?;
        self.out.flush().map_err(ShellError::Io)?;

        let Some(raw) = self.source.next_line().map_err(ShellError::Io)? else {
            debug!("line source reached EOF");
            return Ok(Cycle::Eof);
        };
        let line = raw.trim_end_matches(['\n', '\r']);

        if let Some(prefix) = line.strip_suffix('?') {
            self.render_help(session, tree, prefix)?;
            return Ok(Cycle::Skipped);
        }
        if line.trim().is_empty() {
            return Ok(Cycle::Skipped);
        }

        let outcome = session.execute(tree, line)?;
        debug!(?outcome, line, "evaluated line");
        match outcome {
            Outcome::Complete => {}
            Outcome::Incomplete { .. } => {
                writeln!(self.err, "{}", format_error("% Incomplete command."))
                    .map_err(ShellError::Io)?;
            }
            Outcome::Unrecognized { cursor } => {
                self.render_unrecognized(cursor)?;
            }
        }
        Ok(Cycle::Evaluated(outcome))
    }

    fn render_help(&mut self, session: &mut Session, tree: TreeId, prefix: &str) -> Result<()> {
        match session.help(tree, prefix)? {
            HelpOutcome::Entries(entries) => {
                write!(self.out, "{}", format_help(&entries)).map_err(ShellError::Io)?;
            }
            HelpOutcome::Unrecognized { cursor } => {
                self.render_unrecognized(cursor)?;
            }
        }
        Ok(())
    }

    fn render_unrecognized(&mut self, cursor: usize) -> Result<()> {
        writeln!(self.err, "{}", format_caret(self.prompt.len() + cursor))
            .map_err(ShellError::Io)?;
        writeln!(
            self.err,
            "{}",
            format_error("% Invalid input detected at '^' marker.")
        )
        .map_err(ShellError::Io)?;
        Ok(())
    }
}
