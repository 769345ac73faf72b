//! Severity policy: deciding whether a violation aborts the run.
//!
//! Every violation is routed through [`route`] together with the run's
//! [`SeverityMode`]. In advisory mode the violation is printed with a warning
//! marker right away and handed back to the caller. In strict mode it becomes
//! an error; the caller stops evaluating and the failure is printed once at
//! the edge of the program.

use super::{SeverityMode, Violation};
use crate::error::{GuardError, Result};
use std::io::Write;
use tracing::{error, warn};

/// The leading glyph of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Success,
    Warning,
    Failure,
}

impl Marker {
    pub fn glyph(&self) -> &'static str {
        match self {
            Marker::Success => "✅",
            Marker::Warning => "⚠️ ",
            Marker::Failure => "❌",
        }
    }

    /// Formats a message with this marker's glyph.
    pub fn decorate(&self, message: &str) -> String {
        format!("{} {message}", self.glyph())
    }
}

/// A sink for user-facing messages.
pub trait Reporter {
    fn emit(&mut self, marker: Marker, message: &str);
}

/// Writes messages to standard output as they arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn emit(&mut self, marker: Marker, message: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        // write errors on a closed stdout are ignored
        let _ = writeln!(handle, "{}", marker.decorate(message));
    }
}

/// Keeps messages in memory, in emission order.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    entries: Vec<(Marker, String)>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(Marker, String)] {
        &self.entries
    }

    /// Messages emitted with the given marker.
    pub fn messages(&self, marker: Marker) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(m, _)| *m == marker)
            .map(|(_, message)| message.as_str())
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn emit(&mut self, marker: Marker, message: &str) {
        self.entries.push((marker, message.to_string()));
    }
}

/// Routes one violation according to `mode`.
///
/// Advisory: emits a warning immediately and returns the violation so the
/// caller can record it. Strict: returns the matching [`GuardError`] without
/// emitting anything.
pub fn route(
    violation: Violation,
    mode: SeverityMode,
    reporter: &mut dyn Reporter,
) -> Result<Violation> {
    match mode {
        SeverityMode::Strict => {
            error!(
                subject = %violation.subject(),
                kind = %violation.kind(),
                count = violation.count(),
                "Violation is fatal in strict mode"
            );
            Err(GuardError::from_violation(violation))
        }
        SeverityMode::Advisory => {
            warn!(
                subject = %violation.subject(),
                kind = %violation.kind(),
                count = violation.count(),
                "Violation reported as warning"
            );
            reporter.emit(Marker::Warning, violation.message());
            Ok(violation)
        }
    }
}
