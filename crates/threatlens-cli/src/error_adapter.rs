//! Adapters from ThreatLens errors and extraction diagnostics to miette.
//!
//! This module provides the bridge between the library's error and
//! diagnostic types and miette's rich report formatting used in the CLI.
//! Extraction diagnostics are rendered one report each, with the diagram
//! source as snippet context.

use std::{error::Error as _, fmt};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan};

use threatlens::ThreatLensError;
use threatlens_parser::{
    Span,
    error::{Diagnostic, Severity},
};

/// Adapter for a single extraction diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Source code for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span(), self.src.len());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`ThreatLensError`], which carries no source location.
pub struct ErrorAdapter<'a>(pub &'a ThreatLensError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            ThreatLensError::Io(_) => "threatlens::io",
            ThreatLensError::SchemaMismatch { .. } => "threatlens::schema",
            ThreatLensError::Classifier(_) => "threatlens::classifier",
            ThreatLensError::Config(_) => "threatlens::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            ThreatLensError::SchemaMismatch { .. } => Some(Box::new(
                "the classifier must be fit on the same columns, in the same order",
            )),
            err if err.is_retryable() => Some(Box::new("the failure may be transient; try again")),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`Span`] to a miette [`SourceSpan`], clamped to the source.
fn span_to_miette(span: Span, src_len: usize) -> SourceSpan {
    let start = span.start().min(src_len);
    let end = span.end().min(src_len);
    SourceSpan::new(start.into(), end - start)
}

/// Convert a [`ThreatLensError`] into a reportable error.
pub fn to_reportables(err: &ThreatLensError) -> Vec<Reportable<'_>> {
    vec![Reportable::Error(ErrorAdapter(err))]
}

/// Wrap extraction diagnostics, one reportable each.
pub fn diagnostic_reportables<'a>(diagnostics: &'a [Diagnostic], src: &'a str) -> Vec<Reportable<'a>> {
    diagnostics
        .iter()
        .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
        .collect()
}

#[cfg(test)]
mod tests {
    use threatlens::classify::ClassifierError;
    use threatlens_parser::error::ErrorCode;

    use super::*;

    #[test]
    fn test_warning_diagnostic() {
        let diag = Diagnostic::warning("malformed relationship skipped")
            .with_code(ErrorCode::E101)
            .with_label(Span::new(0..5), "here")
            .with_help("try this");
        let diagnostics = [diag];

        let reportables = diagnostic_reportables(&diagnostics, "Rel(a b)");
        assert_eq!(reportables.len(), 1);

        let reportable = &reportables[0];
        assert_eq!(reportable.to_string(), "malformed relationship skipped");
        assert_eq!(reportable.severity(), Some(MietteSeverity::Warning));
        assert_eq!(reportable.code().map(|c| c.to_string()), Some("E101".to_string()));
    }

    #[test]
    fn test_all_labels_returned() {
        let diag = Diagnostic::warning("entity `a` is declared more than once")
            .with_label(Span::new(0..5), "primary label")
            .with_secondary_label(Span::new(10..15), "secondary label");

        let adapter = DiagnosticAdapter::new(&diag, "some source code");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label(), Some("primary label"));
        assert!(labels[0].primary());
        assert_eq!(labels[1].label(), Some("secondary label"));
        assert!(!labels[1].primary());
    }

    #[test]
    fn test_span_is_clamped_to_source() {
        let span = span_to_miette(Span::new(3..10), 5);
        assert_eq!(span.offset(), 3);
        assert_eq!(span.len(), 2);
    }

    #[test]
    fn test_error_codes() {
        let err = ThreatLensError::Classifier(ClassifierError::Timeout);
        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(
                    e.code().map(|c| c.to_string()),
                    Some("threatlens::classifier".to_string())
                );
                assert!(e.help().is_some());
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_schema_mismatch_has_help() {
        let err = ThreatLensError::SchemaMismatch {
            expected: vec!["A".into()],
            found: vec!["B".into()],
        };
        let adapter = ErrorAdapter(&err);
        assert_eq!(
            adapter.code().map(|c| c.to_string()),
            Some("threatlens::schema".to_string())
        );
        assert!(adapter.help().is_some());
    }
}
