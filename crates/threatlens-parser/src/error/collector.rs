//! Collector for accumulating diagnostics during extraction.

use crate::error::Diagnostic;

/// Accumulates diagnostics so extraction can report every skipped statement
/// in one pass instead of stopping at the first.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Move every diagnostic of `other` into this collector.
    pub fn extend(&mut self, other: DiagnosticCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Finish collection, returning diagnostics ordered by source position.
    ///
    /// Diagnostics without a primary span sort last.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|diagnostic| {
            diagnostic
                .primary_span()
                .map_or(usize::MAX, |span| span.start())
        });
        self.diagnostics
    }
}
