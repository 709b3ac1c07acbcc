//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Status messages respect the quiet flag. Model responses are always
//! written, either rendered as markdown or as the raw text.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use super::markdown;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Log level filter for this verbosity.
    pub fn log_level(&self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Error,
            Verbosity::Normal => log::LevelFilter::Warn,
            Verbosity::Debug => log::LevelFilter::Debug,
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Decide whether a response is rendered as markdown.
///
/// An explicit `--md`/`--no-md` wins; otherwise markdown is used when the
/// config enables it and stdout is a terminal.
pub fn use_markdown(flag: Option<bool>, configured: bool) -> bool {
    flag.unwrap_or_else(|| configured && io::stdout().is_terminal())
}

/// Write a model response to stdout.
pub fn response(text: &str, markdown: bool) -> io::Result<()> {
    if markdown {
        return markdown::print(text);
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn log_levels() {
        assert_eq!(Verbosity::Quiet.log_level(), log::LevelFilter::Error);
        assert_eq!(Verbosity::Debug.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn explicit_markdown_flag_wins() {
        assert!(use_markdown(Some(true), false));
        assert!(!use_markdown(Some(false), true));
        assert!(!use_markdown(None, false));
    }
}
