use proptest::prelude::*;

use threatlens_core::{
    edge::Attribute,
    entity::EntityKind,
    features::{FeatureColumn, MISSING, normalize},
};
use threatlens_parser::{error::ErrorCode, parse};

const SHOP: &str = r#"
@startuml
!include <C4/C4_Container>

title Web shop

Person(customer, "Customer", "Buys things", "SourceType: User")
System_Ext(payments, "Payment Provider", "Card payments\nSourceType: Service")
Container(web, "Web App", "Serves pages", "Rust\nSourceType: Web Application")
ContainerDb(db, "Orders", "Stores orders", "PostgreSQL\nSourceType: Database")

Rel(customer, web, "Browses", "AuthRequired: No, NetworkProtocol: HTTPS, Threat: Spoofing")
Rel_D(web, db, "Reads and writes",
    "AuthRequired: Yes, Encryption: TLS, DataFormat: SQL")
Rel_Right(web, payments, "Charges")

SHOW_LEGEND()
@enduml
"#;

#[test]
fn test_shop_entities() {
    let parsed = parse(SHOP);
    assert!(parsed.diagnostics().is_empty(), "{:?}", parsed.diagnostics());

    let entities = parsed.diagram().entities();
    let ids: Vec<&str> = entities.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["customer", "payments", "web", "db"]);

    let customer = &entities["customer"];
    assert_eq!(customer.kind(), EntityKind::Person);
    assert_eq!(customer.display_name(), "Customer");
    assert_eq!(customer.source_type(), Some("User"));

    let payments = &entities["payments"];
    assert_eq!(payments.kind(), EntityKind::SystemExternal);
    assert_eq!(payments.technology(), None);
    assert_eq!(payments.source_type(), Some("Service"));

    let db = &entities["db"];
    assert_eq!(db.kind(), EntityKind::ContainerDatabase);
    assert_eq!(db.technology(), Some("PostgreSQL\\nSourceType: Database"));
    assert_eq!(db.source_type(), Some("Database"));
}

#[test]
fn test_shop_edges() {
    let parsed = parse(SHOP);
    let edges = parsed.diagram().edges();
    assert_eq!(edges.len(), 3);

    assert_eq!((edges[0].source(), edges[0].target()), ("customer", "web"));
    assert_eq!(edges[0].threat().map(|t| t.as_str()), Some("Spoofing"));
    assert_eq!(
        edges[0].attributes().get(Attribute::NetworkProtocol),
        Some("HTTPS")
    );

    assert_eq!(edges[1].label(), "Reads and writes");
    assert_eq!(edges[1].attributes().get(Attribute::DataFormat), Some("SQL"));
    assert!(edges[1].threat().is_none());

    assert_eq!(edges[2].target(), "payments");
    assert!(edges[2].attributes().is_empty());
}

#[test]
fn test_shop_features() {
    let parsed = parse(SHOP);
    let records = normalize(parsed.diagram());

    assert_eq!(records.len(), 3);
    assert_eq!(records[1].get(FeatureColumn::SourceType), "Web Application");
    assert_eq!(records[1].get(FeatureColumn::TargetType), "Database");
    assert_eq!(
        records[1].get(FeatureColumn::Attribute(Attribute::Encryption)),
        "TLS"
    );
    assert_eq!(
        records[2].get(FeatureColumn::Attribute(Attribute::Encryption)),
        MISSING
    );
}

#[test]
fn test_duplicate_id_last_wins() {
    let source = r#"
Container(api, "Old API", "d", "SourceType: Service")
Container(api, "New API", "d", "SourceType: Web Application")
"#;
    let parsed = parse(source);

    let entities = parsed.diagram().entities();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities["api"].display_name(), "New API");
    assert_eq!(entities["api"].source_type(), Some("Web Application"));

    let diagnostics = parsed.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), Some(ErrorCode::E200));
    assert_eq!(diagnostics[0].labels().len(), 2);
    assert!(!parsed.has_errors());
}

#[test]
fn test_unresolved_reference_is_kept() {
    let parsed = parse("Container(a, \"A\", \"d\")\nRel(a, nowhere, \"x\", \"AuthRequired: Yes\")");

    assert_eq!(parsed.diagram().edges().len(), 1);
    let diagnostics = parsed.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), Some(ErrorCode::E201));
    let span = diagnostics[0].primary_span().expect("span");
    assert_eq!(
        &"Container(a, \"A\", \"d\")\nRel(a, nowhere, \"x\", \"AuthRequired: Yes\")"[span.range()],
        "nowhere"
    );

    let records = normalize(parsed.diagram());
    assert_eq!(records[0].get(FeatureColumn::TargetType), MISSING);
}

#[test]
fn test_forward_reference_resolves() {
    let parsed = parse("Rel(a, b, \"x\")\nPerson(a, \"A\", \"d\")\nSystem(b, \"B\", \"d\")");
    assert!(parsed.diagnostics().is_empty());
}

#[test]
fn test_annotated_statements_are_not_edges() {
    let source = r#"
Rel(a, b, "Threat: SQL Injection", $textColor="red", $lineColor="red")
Rel(a, b, "  Threat: Tampering")
Rel(a, b, "Reads")
"#;
    let parsed = parse(source);
    let edges = parsed.diagram().edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].label(), "Reads");
}

#[test]
fn test_malformed_statements_are_skipped() {
    let source = r#"
Container(web "Web", "d")
Container(db, "DB", "d")
Rel(web, db "x")
Rel(db, db, "loop")
"#;
    let parsed = parse(source);

    assert_eq!(parsed.diagram().entities().len(), 1);
    assert_eq!(parsed.diagram().edges().len(), 1);

    let codes: Vec<_> = parsed
        .diagnostics()
        .iter()
        .filter_map(|diagnostic| diagnostic.code())
        .collect();
    assert_eq!(codes, vec![ErrorCode::E100, ErrorCode::E101]);
    assert!(
        parsed
            .diagnostics()
            .iter()
            .all(|diagnostic| diagnostic.severity().is_warning())
    );
}

#[test]
fn test_unterminated_string_is_reported_as_error() {
    let parsed = parse("Container(db, \"DB, \"d\")\nRel(a, b, \"oops)");
    assert!(parsed.has_errors());
}

fn source_strategy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("Rel(".to_string()),
        Just("Rel_D(".to_string()),
        Just("Container(".to_string()),
        Just("Person(".to_string()),
        Just("\"".to_string()),
        Just(", ".to_string()),
        Just(")".to_string()),
        Just("\n".to_string()),
        Just("'".to_string()),
        Just("/'".to_string()),
        Just("$x=".to_string()),
        "[a-zA-Z0-9_ :ä]{0,8}",
    ];
    proptest::collection::vec(fragment, 0..40).prop_map(|parts| parts.concat())
}

/// Extraction is total: arbitrary text never panics and spans stay in bounds.
fn check_parse_is_total(source: &str) -> Result<(), TestCaseError> {
    let parsed = parse(source);
    for diagnostic in parsed.diagnostics() {
        for label in diagnostic.labels() {
            prop_assert!(label.span().end() <= source.len() + 1);
        }
    }
    for edge in parsed.diagram().edges() {
        prop_assert!(!edge.label().trim_start().starts_with("Threat:"));
    }
    prop_assert_eq!(normalize(parsed.diagram()).len(), parsed.diagram().edges().len());
    Ok(())
}

proptest! {
    #[test]
    fn parse_is_total(source in source_strategy()) {
        check_parse_is_total(&source)?;
    }
}
