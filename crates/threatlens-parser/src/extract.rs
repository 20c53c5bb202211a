//! Extraction phase: turns recognized statements into the semantic diagram.
//!
//! Declarations become entities keyed by id, relationships become edges in
//! source order. Duplicate ids and references to undeclared ids are kept
//! but reported.

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use threatlens_core::{diagram::Diagram, edge::Edge, entity::Entity};

use crate::{
    details::parse_details,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    parser_types::{Declaration, RelationStatement, Statement},
    span::Span,
};

/// Sub-field marker embedded in a declaration's strings.
const SOURCE_TYPE_KEY: &str = "SourceType:";

/// Find an embedded `SourceType: X` in `text`.
///
/// The value ends at a literal `\n` escape, a real line break or the end of
/// the string, and is trimmed. An empty value counts as absent.
pub(crate) fn embedded_source_type(text: &str) -> Option<String> {
    let (_, rest) = text.split_once(SOURCE_TYPE_KEY)?;
    let value = rest.split(['\n', '\r']).next().unwrap_or_default();
    let value = value.split("\\n").next().unwrap_or_default().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// The source type of a declaration: extra string first, then description.
fn declaration_source_type(declaration: &Declaration) -> Option<String> {
    declaration
        .technology()
        .and_then(embedded_source_type)
        .or_else(|| embedded_source_type(declaration.description()))
}

pub(crate) struct Extractor {
    entities: IndexMap<String, Entity>,
    /// Span of the id token of the declaration currently owning each id
    declared_at: IndexMap<String, Span>,
    edges: Vec<Edge>,
    diagnostics: DiagnosticCollector,
}

impl Extractor {
    pub(crate) fn new(diagnostics: DiagnosticCollector) -> Self {
        Self {
            entities: IndexMap::new(),
            declared_at: IndexMap::new(),
            edges: Vec::new(),
            diagnostics,
        }
    }

    pub(crate) fn build(mut self, statements: &[Statement]) -> (Diagram, DiagnosticCollector) {
        debug!(statements = statements.len(); "Extracting diagram");

        let mut relations = Vec::new();
        for statement in statements {
            match statement {
                Statement::Declaration(declaration) => self.add_entity(declaration),
                Statement::Relation(relation) => relations.push(relation),
            }
        }

        // Relations are resolved after every declaration is known, so a
        // relationship may reference an entity declared further down.
        for relation in relations {
            self.add_edge(relation);
        }

        info!(
            entities = self.entities.len(),
            edges = self.edges.len();
            "Diagram extraction completed",
        );
        (Diagram::new(self.entities, self.edges), self.diagnostics)
    }

    fn add_entity(&mut self, declaration: &Declaration) {
        let id = declaration.id().inner().clone();
        let id_span = declaration.id().span();
        let source_type = declaration_source_type(declaration);

        let entity = Entity::new(
            id.clone(),
            declaration.kind(),
            declaration.name(),
            declaration.description(),
            declaration.technology().map(str::to_string),
            source_type,
        );
        trace!(entity:?; "Extracted entity");

        if let Some(previous) = self.declared_at.insert(id.clone(), id_span) {
            warn!(id; "Entity declared more than once, last declaration wins");
            self.diagnostics.emit(
                Diagnostic::warning(format!("entity `{id}` is declared more than once"))
                    .with_code(ErrorCode::E200)
                    .with_label(id_span, "this declaration wins")
                    .with_secondary_label(previous, "earlier declaration")
                    .with_help("rename one of the entities"),
            );
        }

        // Replacing keeps the original insertion position of the id.
        self.entities.insert(id, entity);
    }

    fn add_edge(&mut self, relation: &RelationStatement) {
        if relation.is_annotated() {
            trace!(span:? = relation.span(); "Skipping annotated relationship");
            return;
        }

        for endpoint in [relation.source(), relation.target()] {
            if !self.entities.contains_key(endpoint.inner()) {
                warn!(id = endpoint.inner().as_str(); "Relationship references an undeclared entity");
                self.diagnostics.emit(
                    Diagnostic::warning(format!(
                        "entity `{}` is not declared",
                        endpoint.inner()
                    ))
                    .with_code(ErrorCode::E201)
                    .with_label(endpoint.span(), "undeclared entity")
                    .with_help("its type features will be recorded as missing"),
                );
            }
        }

        let (attributes, threat) = relation
            .details()
            .map(|details| parse_details(details.inner()).into_parts())
            .unwrap_or_default();

        let edge = Edge::new(
            relation.source().inner().as_str(),
            relation.target().inner().as_str(),
            relation.label().inner().as_str(),
            attributes,
            threat,
        );
        trace!(edge:?; "Extracted edge");
        self.edges.push(edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_ends_at_escape() {
        assert_eq!(
            embedded_source_type("PostgreSQL\\nSourceType: Database\\nOwner: Ops"),
            Some("Database".to_string())
        );
    }

    #[test]
    fn test_source_type_ends_at_line_break() {
        assert_eq!(
            embedded_source_type("Stores orders\nSourceType:  Web Application \nmore"),
            Some("Web Application".to_string())
        );
    }

    #[test]
    fn test_source_type_at_end_of_string() {
        assert_eq!(
            embedded_source_type("SourceType: Device"),
            Some("Device".to_string())
        );
    }

    #[test]
    fn test_source_type_absent_or_empty() {
        assert_eq!(embedded_source_type("Rust service"), None);
        assert_eq!(embedded_source_type("Rust\\nSourceType: \\nx"), None);
    }
}
