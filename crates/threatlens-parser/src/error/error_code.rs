//! Diagnostic codes.
//!
//! Codes are organized by what went wrong:
//! - `E0xx` - String literal errors
//! - `E1xx` - Statement structure errors
//! - `E2xx` - Entity reference errors

use std::fmt;

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unterminated string literal.
    ///
    /// A statement argument opens a quote that is never closed. PlantUML
    /// rejects such a source as well, so this is reported as an error.
    E001,

    /// Malformed declaration.
    ///
    /// A `Person`, `System`, `System_Ext`, `Container` or `ContainerDb`
    /// keyword followed by `(` does not continue as
    /// `(<id>, "<name>", "<description>"[, "<extra>"])`.
    E100,

    /// Malformed relationship.
    ///
    /// A `Rel` keyword followed by `(` does not continue as
    /// `(<source>, <target>, "<label>"[, "<details>"])`.
    E101,

    /// Incomplete statement.
    ///
    /// The source ended before the statement was closed.
    E102,

    /// Duplicate entity id.
    ///
    /// Two declarations use the same id. The last declaration wins.
    E200,

    /// Unresolved entity reference.
    ///
    /// A relationship names an id that no declaration introduces. The edge
    /// is kept and its type features are recorded as missing.
    E201,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E100 => "malformed declaration",
            ErrorCode::E101 => "malformed relationship",
            ErrorCode::E102 => "incomplete statement",
            ErrorCode::E200 => "duplicate entity id",
            ErrorCode::E201 => "unresolved entity reference",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E101.to_string(), "E101");
        assert_eq!(ErrorCode::E201.to_string(), "E201");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E100.description(), "malformed declaration");
        assert_eq!(ErrorCode::E200.description(), "duplicate entity id");
    }
}
