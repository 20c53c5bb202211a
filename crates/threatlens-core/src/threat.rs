//! Threat labels produced by the classifier or written as ground truth.

use std::fmt;

use serde::Serialize;

/// A threat label.
///
/// Labels are free text. A label is considered "none" (no annotation
/// required) when it is empty or reads `none` / `No Threat`, ignoring case
/// and surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ThreatLabel(String);

impl ThreatLabel {
    /// The canonical spelling of the "no threat" label.
    pub const NO_THREAT: &'static str = "No Threat";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Create the canonical "no threat" label.
    pub fn none() -> Self {
        Self(Self::NO_THREAT.to_string())
    }

    /// Returns `true` if this label means "no concern".
    pub fn is_none(&self) -> bool {
        let label = self.0.trim();
        label.is_empty()
            || label.eq_ignore_ascii_case("none")
            || label.eq_ignore_ascii_case(Self::NO_THREAT)
    }

    /// Borrow the label text as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the label with all "none" spellings unified to [`Self::NO_THREAT`]
    /// and surrounding whitespace removed.
    pub fn canonical(&self) -> &str {
        if self.is_none() {
            Self::NO_THREAT
        } else {
            self.0.trim()
        }
    }
}

impl fmt::Display for ThreatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreatLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for ThreatLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}
