//! # ThreatLens Parser
//!
//! Tolerant extractor for C4-PlantUML threat-model diagrams. Sources are
//! scanned for entity declarations and relationship statements; everything
//! else is left alone.
//!
//! ## Usage
//!
//! ```
//! # use threatlens_parser::parse;
//!
//! let source = r#"
//!     Container(web, "Web App", "Serves pages", "Rust\nSourceType: Web Application")
//!     ContainerDb(db, "Orders", "Stores orders", "PostgreSQL\nSourceType: Database")
//!     Rel(web, db, "Reads", "AuthRequired: Yes, Encryption: TLS")
//! "#;
//!
//! let parsed = parse(source);
//! assert!(!parsed.has_errors());
//! assert_eq!(parsed.diagram().edges().len(), 1);
//! ```

pub mod details;
pub mod error;
mod extract;
pub mod parser_types;
mod scanner;
mod span;

pub use span::{Span, Spanned};

use log::{debug, info};

use threatlens_core::diagram::Diagram;

use error::Diagnostic;
use extract::Extractor;
use parser_types::{RelationStatement, Statement};

/// The result of extracting a diagram: the diagram plus every diagnostic.
#[derive(Debug, Clone)]
pub struct ParsedDiagram {
    diagram: Diagram,
    diagnostics: Vec<Diagnostic>,
}

impl ParsedDiagram {
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Diagnostics ordered by source position.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
    }

    pub fn into_parts(self) -> (Diagram, Vec<Diagnostic>) {
        (self.diagram, self.diagnostics)
    }
}

/// Extract entities and edges from diagram source text.
///
/// Extraction never fails. Statements that start like a declaration or
/// relationship but do not match the grammar are skipped and reported in
/// [`ParsedDiagram::diagnostics`].
pub fn parse(source: &str) -> ParsedDiagram {
    info!(bytes = source.len(); "Extracting diagram");

    let scan = scanner::scan(source);
    debug!(statements = scan.statements.len(); "Scanned statements");

    let (diagram, diagnostics) = Extractor::new(scan.diagnostics).build(&scan.statements);
    let diagnostics = diagnostics.finish();
    debug!(diagnostics = diagnostics.len(); "Extraction diagnostics");

    ParsedDiagram {
        diagram,
        diagnostics,
    }
}

/// Every relationship statement in `source`, in source order, with spans.
///
/// Unlike [`parse`], annotated statements are included. Malformed
/// statements are skipped silently.
pub fn relation_statements(source: &str) -> Vec<RelationStatement> {
    scanner::scan(source)
        .statements
        .into_iter()
        .filter_map(|statement| match statement {
            Statement::Relation(relation) => Some(relation),
            Statement::Declaration(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_empty_source() {
        let parsed = parse("");
        assert!(parsed.diagram().entities().is_empty());
        assert!(parsed.diagram().edges().is_empty());
        assert!(parsed.diagnostics().is_empty());
    }

    #[test]
    fn test_relation_statements_include_annotated() {
        let source = "Rel(a, b, \"x\")\nRel(a, b, \"Threat: DoS\", $lineColor=\"red\")";
        let relations = relation_statements(source);
        assert_eq!(relations.len(), 2);
        assert!(relations[1].is_annotated());
    }

    #[test]
    fn test_diagnostics_are_ordered() {
        let source = "Rel(a, ghost, \"x\")\nPerson(a, \"A\")\nPerson(a, \"A\", \"d\")";
        let parsed = parse(source);
        let codes: Vec<_> = parsed
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect();
        assert_eq!(codes, vec![ErrorCode::E201, ErrorCode::E100]);
    }
}
