//! Severity modes for a validation run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How data-quality violations are enforced during a run.
///
/// The mode is chosen once when a run starts and passed explicitly into every
/// evaluation that can produce a violation. Structural preconditions (missing
/// dataset, missing required columns) are fatal in both modes.
///
/// # Examples
///
/// ```rust
/// use ev_guard::core::SeverityMode;
///
/// assert_eq!(SeverityMode::from_strict_flag(true), SeverityMode::Strict);
/// assert!(SeverityMode::Strict.is_strict());
/// assert_eq!(SeverityMode::default(), SeverityMode::Advisory);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeverityMode {
    /// The first violation aborts the run
    Strict,
    /// Violations are reported as warnings and the run continues
    #[default]
    Advisory,
}

impl SeverityMode {
    /// Maps a `--strict` style flag to a mode.
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Advisory
        }
    }

    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Advisory => "advisory",
        }
    }

    /// Returns true if violations are fatal in this mode.
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl fmt::Display for SeverityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
