//! Statement types recognized in diagram sources, with spans.
//!
//! These are the syntactic view of a diagram: every string is kept verbatim
//! and every statement knows the exact byte range it occupies, which is what
//! the annotator needs to rewrite statements in place.

use threatlens_core::entity::EntityKind;

use crate::span::{Span, Spanned};

/// The label prefix that marks a relationship as already annotated.
pub const THREAT_LABEL_PREFIX: &str = "Threat:";

/// `<Kind>(<id>, "<name>", "<description>"[, "<extra>"])`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub(crate) kind: EntityKind,
    pub(crate) id: Spanned<String>,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) technology: Option<String>,
    pub(crate) span: Span,
}

impl Declaration {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &Spanned<String> {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The optional fourth positional string.
    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    /// The span of the whole statement, keyword through closing parenthesis.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// `Rel(<source>, <target>, "<label>"[, "<details>"])` and its directional variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationStatement {
    pub(crate) keyword: String,
    pub(crate) source: Spanned<String>,
    pub(crate) target: Spanned<String>,
    pub(crate) label: Spanned<String>,
    pub(crate) details: Option<Spanned<String>>,
    pub(crate) span: Span,
}

impl RelationStatement {
    /// The macro keyword as written, e.g. `Rel` or `Rel_Down`.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn source(&self) -> &Spanned<String> {
        &self.source
    }

    pub fn target(&self) -> &Spanned<String> {
        &self.target
    }

    pub fn label(&self) -> &Spanned<String> {
        &self.label
    }

    pub fn details(&self) -> Option<&Spanned<String>> {
        self.details.as_ref()
    }

    /// The span of the whole statement, keyword through closing parenthesis.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns `true` if the label carries a threat annotation.
    ///
    /// Annotated statements are never extracted as edges, so re-running the
    /// pipeline on its own output does not classify the annotation text.
    pub fn is_annotated(&self) -> bool {
        self.label
            .inner()
            .trim_start()
            .starts_with(THREAT_LABEL_PREFIX)
    }
}

/// A recognized statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Declaration(Declaration),
    Relation(RelationStatement),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Declaration(declaration) => declaration.span(),
            Statement::Relation(relation) => relation.span(),
        }
    }
}
