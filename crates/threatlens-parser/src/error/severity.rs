//! Severity levels for diagnostics.

use std::fmt;

/// The severity level of a diagnostic.
///
/// Neither level stops extraction:
/// - [`Severity::Error`] means text after the diagnostic was probably lost
///   (for example an unterminated string swallowed the rest of the file)
/// - [`Severity::Warning`] means a single statement or reference was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}
