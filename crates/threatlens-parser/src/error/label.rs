//! Labeled source spans for diagnostics.

use crate::span::Span;

/// A message attached to a span of the diagram source.
///
/// A diagnostic has one primary label marking the statement at fault and
/// may carry secondary labels for related locations, such as the earlier
/// declaration of a duplicated id.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
