//! Statement scanner for diagram source text.
//!
//! Diagram sources are only partly made of statements the extractor cares
//! about; the rest is styling, includes, titles and comments. The scanner
//! walks the text and, at every identifier boundary where a known keyword
//! starts, tries the statement grammar:
//!
//! ```text
//! <Kind>(<id>, "<name>", "<description>"[, "<extra>"]…[, $key=value]…)
//! Rel[_U|_D|_L|_R|_Up|_Down|_Left|_Right](<source>, <target>, "<label>"[, "<details>"]…[, $key=value]…)
//! ```
//!
//! A keyword that is not followed by `(` is plain text. Once `(` is seen the
//! parser commits: a body that does not match produces a diagnostic and
//! the scan resumes right after the keyword. Statements inside PlantUML
//! comments (`'` at line start, `/' … '/` blocks) are not recognized.

use log::trace;
use winnow::{
    Parser as _,
    ascii::{multispace0, space0},
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, take_till, take_while},
};

use threatlens_core::entity::EntityKind;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    parser_types::{Declaration, RelationStatement, Statement},
    span::{Span, Spanned},
};

/// Diagnostic information attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatementDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
}

const MALFORMED_DECLARATION: StatementDiagnostic = StatementDiagnostic {
    code: ErrorCode::E100,
    message: "malformed declaration skipped",
    help: Some("expected `<Kind>(<id>, \"<name>\", \"<description>\"[, \"<extra>\"])`"),
};

const MALFORMED_RELATION: StatementDiagnostic = StatementDiagnostic {
    code: ErrorCode::E101,
    message: "malformed relationship skipped",
    help: Some("expected `Rel(<source>, <target>, \"<label>\"[, \"<details>\"])`"),
};

const UNTERMINATED_STRING: StatementDiagnostic = StatementDiagnostic {
    code: ErrorCode::E001,
    message: "unterminated string literal",
    help: Some("add the closing `\"`"),
};

type Input<'src> = LocatingSlice<&'src str>;
type IResult<O> = ModalResult<O, ContextError<StatementDiagnostic>>;

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whitespace, including line breaks
fn ws(input: &mut Input<'_>) -> IResult<()> {
    multispace0.void().parse_next(input)
}

fn comma(input: &mut Input<'_>) -> IResult<()> {
    (ws, ',', ws).void().parse_next(input)
}

/// Opening parenthesis directly after a keyword; only spaces and tabs may separate them
fn open_paren(input: &mut Input<'_>) -> IResult<()> {
    (space0, '(').void().parse_next(input)
}

fn close_paren(input: &mut Input<'_>) -> IResult<()> {
    (ws, ')').void().parse_next(input)
}

fn quote(input: &mut Input<'_>) -> IResult<char> {
    '"'.parse_next(input)
}

fn identifier(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    take_while(1.., is_identifier_char)
        .with_span()
        .map(|(id, range): (&str, _)| Spanned::new(id.to_string(), Span::new(range)))
        .parse_next(input)
}

/// Parse a double-quoted string; content is kept verbatim and may span lines.
///
/// PlantUML strings have no escape sequences, so `\n` stays two characters.
fn string_literal(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    let start = input.current_token_start();

    quote.parse_next(input)?;
    let content = cut_err(terminated(take_till(0.., '"'), quote))
        .context(UNTERMINATED_STRING)
        .parse_next(input)?;

    let end = input.current_token_start();
    Ok(Spanned::new(content.to_string(), Span::new(start..end)))
}

fn positional_string(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    preceded(comma, string_literal).parse_next(input)
}

/// Additional positional strings the extractor does not use (sprites, tags, links)
fn extra_positionals(input: &mut Input<'_>) -> IResult<()> {
    repeat(0.., positional_string.void()).parse_next(input)
}

fn bare_value(input: &mut Input<'_>) -> IResult<()> {
    take_while(1.., |c: char| !matches!(c, ',' | ')' | '\n'))
        .void()
        .parse_next(input)
}

/// `, $name="value"` or `, $name=value`
fn keyword_argument(input: &mut Input<'_>) -> IResult<()> {
    (
        comma,
        '$',
        take_while(1.., is_identifier_char),
        ws,
        '=',
        ws,
        alt((string_literal.void(), bare_value)),
    )
        .void()
        .parse_next(input)
}

fn keyword_arguments(input: &mut Input<'_>) -> IResult<()> {
    repeat(0.., keyword_argument).parse_next(input)
}

fn entity_kind(input: &mut Input<'_>) -> IResult<EntityKind> {
    alt((
        literal("Person").value(EntityKind::Person),
        literal("System_Ext").value(EntityKind::SystemExternal),
        literal("System").value(EntityKind::System),
        literal("ContainerDb").value(EntityKind::ContainerDatabase),
        literal("Container").value(EntityKind::Container),
    ))
    .parse_next(input)
}

type DeclarationArguments = (
    Spanned<String>,
    Spanned<String>,
    Spanned<String>,
    Option<Spanned<String>>,
);

fn declaration_arguments(input: &mut Input<'_>) -> IResult<DeclarationArguments> {
    let id = preceded(ws, identifier).parse_next(input)?;
    let name = positional_string(input)?;
    let description = positional_string(input)?;
    let technology = opt(positional_string).parse_next(input)?;
    extra_positionals(input)?;
    keyword_arguments(input)?;
    close_paren(input)?;

    Ok((id, name, description, technology))
}

fn declaration(input: &mut Input<'_>) -> IResult<Declaration> {
    let start = input.current_token_start();

    let kind = terminated(entity_kind, open_paren).parse_next(input)?;
    let (id, name, description, technology) = cut_err(declaration_arguments)
        .context(MALFORMED_DECLARATION)
        .parse_next(input)?;

    let end = input.current_token_start();
    Ok(Declaration {
        kind,
        id,
        name: name.into_inner(),
        description: description.into_inner(),
        technology: technology.map(Spanned::into_inner),
        span: Span::new(start..end),
    })
}

/// `Rel` with an optional direction suffix, longest suffixes first
fn relation_keyword<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    (
        literal("Rel"),
        opt(alt((
            literal("_Up"),
            literal("_Down"),
            literal("_Left"),
            literal("_Right"),
            literal("_U"),
            literal("_D"),
            literal("_L"),
            literal("_R"),
        ))),
    )
        .take()
        .parse_next(input)
}

type RelationArguments = (
    Spanned<String>,
    Spanned<String>,
    Spanned<String>,
    Option<Spanned<String>>,
);

fn relation_arguments(input: &mut Input<'_>) -> IResult<RelationArguments> {
    let source = preceded(ws, identifier).parse_next(input)?;
    let target = preceded(comma, identifier).parse_next(input)?;
    let label = positional_string(input)?;
    let details = opt(positional_string).parse_next(input)?;
    extra_positionals(input)?;
    keyword_arguments(input)?;
    close_paren(input)?;

    Ok((source, target, label, details))
}

fn relation(input: &mut Input<'_>) -> IResult<RelationStatement> {
    let start = input.current_token_start();

    let keyword = terminated(relation_keyword, open_paren).parse_next(input)?;
    let (source, target, label, details) = cut_err(relation_arguments)
        .context(MALFORMED_RELATION)
        .parse_next(input)?;

    let end = input.current_token_start();
    Ok(RelationStatement {
        keyword: keyword.to_string(),
        source,
        target,
        label,
        details,
        span: Span::new(start..end),
    })
}

fn statement(input: &mut Input<'_>) -> IResult<Statement> {
    alt((
        declaration.map(Statement::Declaration),
        relation.map(Statement::Relation),
    ))
    .parse_next(input)
}

/// Returns `true` if `c` can start a statement keyword.
fn starts_keyword(c: char) -> bool {
    matches!(c, 'P' | 'S' | 'C' | 'R')
}

/// The statements found in a source text and the diagnostics for the ones skipped.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    pub(crate) statements: Vec<Statement>,
    pub(crate) diagnostics: DiagnosticCollector,
}

/// Scanner that accumulates statements and diagnostics in one pass.
struct Scanner<'src> {
    source: &'src str,
    scan: Scan,
}

impl<'src> Scanner<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            scan: Scan::default(),
        }
    }

    fn run(&mut self) {
        let mut pos = 0;
        let mut prev: Option<char> = None;
        let mut at_line_start = true;

        while let Some(ch) = self.source[pos..].chars().next() {
            if self.source[pos..].starts_with("/'") {
                pos = self.block_comment_end(pos);
                prev = None;
                at_line_start = false;
                continue;
            }

            if ch == '\'' && at_line_start {
                pos = self.line_end(pos);
                continue;
            }

            if starts_keyword(ch) && !prev.is_some_and(is_identifier_char) {
                if let Some(end) = self.try_statement(pos) {
                    pos = end;
                    prev = Some(')');
                    at_line_start = false;
                    continue;
                }
            }

            at_line_start = ch == '\n' || (at_line_start && (ch == ' ' || ch == '\t'));
            prev = Some(ch);
            pos += ch.len_utf8();
        }
    }

    /// Try the statement grammar at `pos`, returning the end offset on success.
    fn try_statement(&mut self, pos: usize) -> Option<usize> {
        let mut input = LocatingSlice::new(self.source);
        let _ = input.next_slice(pos);

        match statement(&mut input) {
            Ok(statement) => {
                trace!(statement:?; "Recognized statement");
                self.scan.statements.push(statement);
                Some(input.current_token_start())
            }
            Err(ErrMode::Backtrack(_)) => None,
            Err(err) => {
                let error_pos = input.current_token_start();
                let diagnostic = self.convert_err_mode(err, pos, error_pos);
                self.scan.diagnostics.emit(diagnostic);
                None
            }
        }
    }

    /// Offset of the line break ending the line that contains `pos`, or the end of input.
    fn line_end(&self, pos: usize) -> usize {
        self.source[pos..]
            .find('\n')
            .map_or(self.source.len(), |offset| pos + offset)
    }

    /// Offset just past the `'/` closing the block comment opened at `pos`.
    fn block_comment_end(&self, pos: usize) -> usize {
        let body = pos + 2;
        self.source[body..]
            .find("'/")
            .map_or(self.source.len(), |offset| body + offset + 2)
    }

    /// Convert a committed parse failure into a diagnostic.
    ///
    /// Uses the innermost [`StatementDiagnostic`] context. A statement whose
    /// failure position is the end of input is reported as incomplete.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<StatementDiagnostic>>,
        start: usize,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        let span = Span::new(start..error_pos.max(start + 1));

        let Some(StatementDiagnostic {
            code,
            message,
            help,
        }) = context_error.context().next().cloned()
        else {
            return Diagnostic::warning("malformed statement skipped")
                .with_label(span, "does not match the statement grammar");
        };

        let (code, message) = if code != ErrorCode::E001 && error_pos >= self.source.len() {
            (ErrorCode::E102, "statement is not closed before the end of input")
        } else {
            (code, message)
        };

        let diagnostic = if code == ErrorCode::E001 {
            Diagnostic::error(message)
        } else {
            Diagnostic::warning(message)
        };

        let diagnostic = diagnostic
            .with_code(code)
            .with_label(span, code.description());
        match help {
            Some(help) => diagnostic.with_help(help),
            None => diagnostic,
        }
    }

    fn finish(self) -> Scan {
        self.scan
    }
}

/// Scan `source` for declarations and relationship statements.
pub(crate) fn scan(source: &str) -> Scan {
    let mut scanner = Scanner::new(source);
    scanner.run();
    scanner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(source: &str) -> Vec<Statement> {
        scan(source).statements
    }

    fn diagnostics(source: &str) -> Vec<Diagnostic> {
        scan(source).diagnostics.finish()
    }

    fn single_relation(source: &str) -> RelationStatement {
        match statements(source).as_slice() {
            [Statement::Relation(relation)] => relation.clone(),
            other => panic!("Expected one relation, got {other:?}"),
        }
    }

    fn single_declaration(source: &str) -> Declaration {
        match statements(source).as_slice() {
            [Statement::Declaration(declaration)] => declaration.clone(),
            other => panic!("Expected one declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_kinds() {
        let cases = [
            ("Person(u, \"User\", \"d\")", EntityKind::Person),
            ("System(s, \"Sys\", \"d\")", EntityKind::System),
            ("System_Ext(x, \"Ext\", \"d\")", EntityKind::SystemExternal),
            ("Container(c, \"Web\", \"d\")", EntityKind::Container),
            ("ContainerDb(db, \"DB\", \"d\")", EntityKind::ContainerDatabase),
        ];
        for (source, kind) in cases {
            assert_eq!(single_declaration(source).kind(), kind, "{source}");
        }
    }

    #[test]
    fn test_declaration_fields_and_span() {
        let source = "  Container(web, \"Web App\", \"Serves pages\", \"Rust\")\n";
        let declaration = single_declaration(source);

        assert_eq!(declaration.id().inner(), "web");
        assert_eq!(declaration.id().span().slice(source), "web");
        assert_eq!(declaration.name(), "Web App");
        assert_eq!(declaration.description(), "Serves pages");
        assert_eq!(declaration.technology(), Some("Rust"));
        assert_eq!(
            declaration.span().slice(source),
            "Container(web, \"Web App\", \"Serves pages\", \"Rust\")"
        );
    }

    #[test]
    fn test_multiline_declaration() {
        let source = "ContainerDb(db,\n    \"Orders\",\n    \"Stores\norders\",\n    \"PostgreSQL\\nSourceType: Database\"\n)";
        let declaration = single_declaration(source);

        assert_eq!(declaration.description(), "Stores\norders");
        assert_eq!(
            declaration.technology(),
            Some("PostgreSQL\\nSourceType: Database")
        );
    }

    #[test]
    fn test_declaration_with_keyword_arguments() {
        let declaration =
            single_declaration("Person(admin, \"Admin\", \"Operates\", $tags=\"internal\", $link=x)");
        assert_eq!(declaration.id().inner(), "admin");
        assert_eq!(declaration.technology(), None);
    }

    #[test]
    fn test_keyword_boundaries() {
        assert!(statements("MyContainer(c, \"a\", \"b\")").is_empty());
        assert!(statements("Container_Ext(c, \"a\", \"b\")").is_empty());
        assert!(statements("ContainerDb_Ext(c, \"a\", \"b\")").is_empty());
        assert!(statements("BiRel(a, b, \"x\")").is_empty());
        assert!(statements("Release(a, b, \"x\")").is_empty());
        assert!(statements("Person\n(u, \"a\", \"b\")").is_empty());
    }

    #[test]
    fn test_relation_fields() {
        let source = "Rel( web ,db, \"Reads\", \"AuthRequired: Yes\")";
        let relation = single_relation(source);

        assert_eq!(relation.keyword(), "Rel");
        assert_eq!(relation.source().inner(), "web");
        assert_eq!(relation.target().inner(), "db");
        assert_eq!(relation.label().inner(), "Reads");
        assert_eq!(
            relation.details().map(|details| details.inner().as_str()),
            Some("AuthRequired: Yes")
        );
        assert_eq!(relation.span().slice(source), source);
    }

    #[test]
    fn test_relation_without_details() {
        let relation = single_relation("Rel(a, b, \"Uses\")");
        assert!(relation.details().is_none());
    }

    #[test]
    fn test_relation_directions() {
        for keyword in [
            "Rel_U", "Rel_D", "Rel_L", "Rel_R", "Rel_Up", "Rel_Down", "Rel_Left", "Rel_Right",
        ] {
            let relation = single_relation(&format!("{keyword}(a, b, \"x\")"));
            assert_eq!(relation.keyword(), keyword);
        }
        assert!(statements("Rel_Back(a, b, \"x\")").is_empty());
    }

    #[test]
    fn test_annotated_relation_is_recognized() {
        let relation =
            single_relation("Rel(a, b, \"Threat: DoS\", $textColor=\"red\", $lineColor=\"red\")");
        assert!(relation.is_annotated());
        assert!(!single_relation("Rel(a, b, \"Reads\")").is_annotated());
    }

    #[test]
    fn test_comments_are_ignored() {
        let source = "' Rel(a, b, \"x\")\n  ' Container(c, \"a\", \"b\")\n/' Rel(c, d, \"y\") '/\nRel(e, f, \"z\")";
        let found = statements(source);

        assert_eq!(found.len(), 1);
        match &found[0] {
            Statement::Relation(relation) => assert_eq!(relation.source().inner(), "e"),
            other => panic!("Expected relation, got {other:?}"),
        }
    }

    #[test]
    fn test_quote_inside_line_is_not_a_comment() {
        let source = "title It's a shop\nRel(a, b, \"x\")";
        assert_eq!(statements(source).len(), 1);
    }

    #[test]
    fn test_malformed_relation_is_skipped_with_warning() {
        let source = "Rel(a b, \"x\")\nRel(c, d, \"y\")";
        let scan = scan(source);

        assert_eq!(scan.statements.len(), 1);
        let diagnostics = scan.diagnostics.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E101));
        assert!(diagnostics[0].severity().is_warning());
        assert_eq!(diagnostics[0].primary_span().map(|s| s.start()), Some(0));
    }

    #[test]
    fn test_malformed_declaration_is_skipped_with_warning() {
        let diagnostics = diagnostics("Person(user, \"User\")");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let diagnostics = diagnostics("Rel(a, b, \"never closed)");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E001));
        assert!(diagnostics[0].severity().is_error());
    }

    #[test]
    fn test_incomplete_statement_at_end_of_input() {
        let diagnostics = diagnostics("Rel(a, b, \"x\"");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_plain_text_produces_no_diagnostics() {
        let source = "@startuml\n!include <C4/C4_Container>\nSHOW_LEGEND()\nLAYOUT_TOP_DOWN()\n@enduml";
        let scan = scan(source);
        assert!(scan.statements.is_empty());
        assert!(scan.diagnostics.finish().is_empty());
    }

    #[test]
    fn test_non_ascii_text_is_skipped() {
        let source = "title Übersicht – Bestellungen\nRel(a, b, \"Größe\")";
        let relation = single_relation(source);
        assert_eq!(relation.label().inner(), "Größe");
    }
}
