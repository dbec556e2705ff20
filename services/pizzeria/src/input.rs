//! Line input sources
//!
//! The session controller reads user input through an injected
//! `LineSource` instead of a global reader, so tests can script a whole
//! session.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Supplier of console input lines
pub trait LineSource {
    /// Show `prompt` and return the next input line, or `None` once the
    /// source is exhausted.
    fn next_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Interactive source reading from standard input
#[derive(Debug, Default)]
pub struct StdinSource;

impl StdinSource {
    pub fn new() -> Self {
        Self
    }
}

impl LineSource for StdinSource {
    fn next_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Pre-recorded source used to drive a session from a script
#[derive(Debug, Default)]
pub struct ScriptedSource {
    lines: VecDeque<String>,
}

impl ScriptedSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for ScriptedSource {
    fn next_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_drains_in_order() {
        let mut source = ScriptedSource::new(["1", "alice", "pw1"]);
        assert_eq!(source.next_line("> ").unwrap(), Some("1".to_string()));
        assert_eq!(source.next_line("> ").unwrap(), Some("alice".to_string()));
        assert_eq!(source.next_line("> ").unwrap(), Some("pw1".to_string()));
        assert_eq!(source.next_line("> ").unwrap(), None);
    }
}
