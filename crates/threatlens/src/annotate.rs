//! Rewrites relationship statements in diagram source to show their threats.
//!
//! Only whole relationship statements are replaced; every other byte of the
//! source is copied unchanged. A rewritten statement reads
//!
//! ```text
//! Rel_D(web, db, "Threat: SQL Injection", $textColor="red", $lineColor="red")
//! ```
//!
//! which the extractor treats as already annotated, so annotating an
//! annotated source changes nothing.

use std::collections::HashMap;

use log::{debug, info};

use threatlens_core::{edge::Edge, threat::ThreatLabel};
use threatlens_parser::{
    parser_types::{RelationStatement, THREAT_LABEL_PREFIX},
    relation_statements,
};

/// Style arguments used when none are configured.
pub const DEFAULT_STYLE: &str = "$textColor=\"red\", $lineColor=\"red\"";

/// Render the replacement text for one annotated statement.
fn annotated_statement(statement: &RelationStatement, threat: &ThreatLabel, style: &str) -> String {
    let threat = threat.as_str().trim().replace('"', "'");
    let style = style.trim();

    let mut text = format!(
        "{}({}, {}, \"{THREAT_LABEL_PREFIX} {threat}\"",
        statement.keyword(),
        statement.source().inner(),
        statement.target().inner(),
    );
    if !style.is_empty() {
        text.push_str(", ");
        text.push_str(style);
    }
    text.push(')');
    text
}

/// Annotate `source` with the predicted threats of `edges`.
///
/// A relationship statement is rewritten when it is not already annotated
/// and the first edge with the same `(source, target)` pair carries a
/// prediction that is not "none". `style` is appended to the rewritten
/// statement as is.
pub fn annotate(source: &str, edges: &[Edge], style: &str) -> String {
    let mut threats: HashMap<(&str, &str), Option<&ThreatLabel>> = HashMap::new();
    for edge in edges {
        threats
            .entry((edge.source(), edge.target()))
            .or_insert(edge.predicted_threat());
    }

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut rewritten = 0;

    for statement in relation_statements(source) {
        if statement.is_annotated() {
            continue;
        }

        let key = (
            statement.source().inner().as_str(),
            statement.target().inner().as_str(),
        );
        let Some(Some(threat)) = threats.get(&key) else {
            continue;
        };
        if threat.is_none() {
            continue;
        }

        let span = statement.span();
        output.push_str(&source[cursor..span.start()]);
        output.push_str(&annotated_statement(&statement, threat, style));
        cursor = span.end();
        rewritten += 1;

        debug!(
            source = key.0,
            target = key.1,
            threat = threat.as_str();
            "Annotated relationship",
        );
    }
    output.push_str(&source[cursor..]);

    info!(rewritten; "Diagram annotated");
    output
}
