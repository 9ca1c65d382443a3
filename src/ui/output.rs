//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Every outcome line is tagged with its level (`[INFO]`, `[WARNING]`,
//! `[ERROR]`) and written to stdout. Quiet mode drops `[INFO]` lines;
//! warnings and errors are always shown.

use std::fmt;
use std::sync::Mutex;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - warnings and errors only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - normal output plus tracing diagnostics
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
}

/// Severity of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    /// Tag printed in front of the message.
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Warning => "[WARNING]",
            Level::Error => "[ERROR]",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Sink for user-facing outcome lines.
pub trait Reporter {
    /// Report one message.
    fn report(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::Warning, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Format a tagged line.
pub fn format_line(level: Level, message: &str) -> String {
    format!("{} {}", level.tag(), message)
}

/// Reporter that prints to stdout.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbosity: Verbosity,
}

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, level: Level, message: &str) {
        if level == Level::Info && self.verbosity == Verbosity::Quiet {
            return;
        }
        println!("{}", format_line(level, message));
    }
}

/// Reporter that keeps every line in memory.
#[derive(Debug, Default)]
pub struct CaptureReporter {
    lines: Mutex<Vec<(Level, String)>>,
}

impl CaptureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines, tagged, in report order.
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|(level, message)| format_line(*level, message))
            .collect()
    }

    /// Captured `(level, message)` pairs.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    /// Captured messages at `level`.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Reporter for CaptureReporter {
    fn report(&self, level: Level, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_levels() {
        assert_eq!(format_line(Level::Info, "x"), "[INFO] x");
        assert_eq!(format_line(Level::Warning, "x"), "[WARNING] x");
        assert_eq!(format_line(Level::Error, "x"), "[ERROR] x");
    }

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn capture_keeps_order() {
        let capture = CaptureReporter::new();
        capture.info("one");
        capture.warn("two");
        capture.error("three");
        assert_eq!(
            capture.lines(),
            vec!["[INFO] one", "[WARNING] two", "[ERROR] three"]
        );
        assert_eq!(capture.at(Level::Warning), vec!["two".to_string()]);
        assert!(capture.contains("[ERROR] thr"));
    }
}
