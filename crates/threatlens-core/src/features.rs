//! The classifier feature schema and the normalizer that produces it.
//!
//! The classifier was fit on a fixed 14-column table. Its one-hot encoder is
//! schema-rigid: a reordered column or a different spelling of "missing"
//! does not fail, it silently drops the category. The schema is therefore
//! defined exactly once, here, as [`FEATURE_COLUMNS`] plus [`MISSING`], and
//! every feature row in the workspace is built through [`normalize`].
//!
//! # Column order
//!
//! ```text
//! SourceType, TargetType, AuthRequired, Encryption, EncryptionType,
//! DataFormat, Frequency, DataIntegrity, AccessType, AccessTarget,
//! NetworkProtocol, CommunicationChannel, CredentialStorage, Interactor
//! ```

use std::fmt;

use log::{debug, trace};

use crate::{diagram::Diagram, edge::Attribute};

/// The explicit value recorded for any absent feature.
pub const MISSING: &str = "Missing";

/// Number of columns in a feature record.
pub const FEATURE_COUNT: usize = 2 + Attribute::COUNT;

/// One column of the classifier schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    /// The `SourceType` of the edge's source entity.
    SourceType,
    /// The `SourceType` of the edge's target entity.
    TargetType,
    /// A detail-string attribute.
    Attribute(Attribute),
}

impl FeatureColumn {
    /// Returns the column name the classifier was fit with.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::SourceType => "SourceType",
            FeatureColumn::TargetType => "TargetType",
            FeatureColumn::Attribute(attribute) => attribute.as_str(),
        }
    }

    fn index(self) -> usize {
        match self {
            FeatureColumn::SourceType => 0,
            FeatureColumn::TargetType => 1,
            FeatureColumn::Attribute(attribute) => 2 + attribute.index(),
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The classifier schema, in column order.
pub const FEATURE_COLUMNS: [FeatureColumn; FEATURE_COUNT] = [
    FeatureColumn::SourceType,
    FeatureColumn::TargetType,
    FeatureColumn::Attribute(Attribute::AuthRequired),
    FeatureColumn::Attribute(Attribute::Encryption),
    FeatureColumn::Attribute(Attribute::EncryptionType),
    FeatureColumn::Attribute(Attribute::DataFormat),
    FeatureColumn::Attribute(Attribute::Frequency),
    FeatureColumn::Attribute(Attribute::DataIntegrity),
    FeatureColumn::Attribute(Attribute::AccessType),
    FeatureColumn::Attribute(Attribute::AccessTarget),
    FeatureColumn::Attribute(Attribute::NetworkProtocol),
    FeatureColumn::Attribute(Attribute::CommunicationChannel),
    FeatureColumn::Attribute(Attribute::CredentialStorage),
    FeatureColumn::Attribute(Attribute::Interactor),
];

/// Returns the schema's column names, in order.
pub fn column_names() -> Vec<String> {
    FEATURE_COLUMNS
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

/// One classifier input row, positionally matching [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    values: [String; FEATURE_COUNT],
}

impl FeatureRecord {
    /// Get the value of `column`.
    pub fn get(&self, column: FeatureColumn) -> &str {
        &self.values[column.index()]
    }

    /// Borrow the values in column order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Iterate over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureColumn, &str)> {
        FEATURE_COLUMNS
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Returns `true` if `column` holds the [`MISSING`] sentinel.
    pub fn is_missing(&self, column: FeatureColumn) -> bool {
        self.get(column) == MISSING
    }
}

/// Project every edge of `diagram` onto the classifier schema.
///
/// Source and target types come from the entity table; ids that resolve to
/// nothing, entities without a source type, and absent attributes all
/// become [`MISSING`]. The output has one record per edge, in edge order.
pub fn normalize(diagram: &Diagram) -> Vec<FeatureRecord> {
    let records: Vec<FeatureRecord> = diagram
        .edges()
        .iter()
        .map(|edge| {
            let endpoint_type = |id: &str| {
                diagram
                    .entity(id)
                    .and_then(|entity| entity.source_type())
                    .unwrap_or(MISSING)
                    .to_string()
            };

            let values = FEATURE_COLUMNS.map(|column| match column {
                FeatureColumn::SourceType => endpoint_type(edge.source()),
                FeatureColumn::TargetType => endpoint_type(edge.target()),
                FeatureColumn::Attribute(attribute) => edge
                    .attributes()
                    .get(attribute)
                    .unwrap_or(MISSING)
                    .to_string(),
            });

            FeatureRecord { values }
        })
        .collect();

    debug!(records = records.len(); "Normalized edges into feature records");
    trace!(records:?; "Feature records");

    records
}
