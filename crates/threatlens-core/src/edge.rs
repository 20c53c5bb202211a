//! Data-flow edges and their security attributes.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::threat::ThreatLabel;

/// The fixed vocabulary of security attributes carried by an edge's detail string.
///
/// The declaration order is the classifier column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    AuthRequired,
    Encryption,
    EncryptionType,
    DataFormat,
    Frequency,
    DataIntegrity,
    AccessType,
    AccessTarget,
    NetworkProtocol,
    CommunicationChannel,
    CredentialStorage,
    Interactor,
}

impl Attribute {
    /// Number of attributes in the vocabulary.
    pub const COUNT: usize = 12;

    /// All attributes, in column order.
    pub const ALL: [Attribute; Self::COUNT] = [
        Attribute::AuthRequired,
        Attribute::Encryption,
        Attribute::EncryptionType,
        Attribute::DataFormat,
        Attribute::Frequency,
        Attribute::DataIntegrity,
        Attribute::AccessType,
        Attribute::AccessTarget,
        Attribute::NetworkProtocol,
        Attribute::CommunicationChannel,
        Attribute::CredentialStorage,
        Attribute::Interactor,
    ];

    /// Returns the key as written in detail strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::AuthRequired => "AuthRequired",
            Attribute::Encryption => "Encryption",
            Attribute::EncryptionType => "EncryptionType",
            Attribute::DataFormat => "DataFormat",
            Attribute::Frequency => "Frequency",
            Attribute::DataIntegrity => "DataIntegrity",
            Attribute::AccessType => "AccessType",
            Attribute::AccessTarget => "AccessTarget",
            Attribute::NetworkProtocol => "NetworkProtocol",
            Attribute::CommunicationChannel => "CommunicationChannel",
            Attribute::CredentialStorage => "CredentialStorage",
            Attribute::Interactor => "Interactor",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Attribute {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|attribute| attribute.as_str() == s)
            .ok_or("Unknown attribute")
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A total map over the attribute vocabulary.
///
/// Every [`Attribute`] has a slot; absent values are `None`, never omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: [Option<String>; Attribute::COUNT],
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value recorded for `attribute`, if any.
    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        self.values[attribute.index()].as_deref()
    }

    /// Returns `true` if a value is recorded for `attribute`.
    pub fn contains(&self, attribute: Attribute) -> bool {
        self.values[attribute.index()].is_some()
    }

    /// Record `value` for `attribute`, replacing any previous value.
    pub fn insert(&mut self, attribute: Attribute, value: impl Into<String>) {
        self.values[attribute.index()] = Some(value.into());
    }

    /// Iterate over all attributes in column order with their optional values.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, Option<&str>)> {
        Attribute::ALL
            .into_iter()
            .map(|attribute| (attribute, self.get(attribute)))
    }

    /// Number of attributes with a recorded value.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (attribute, value) in self.iter() {
            if let Some(value) = value {
                map.serialize_entry(attribute.as_str(), value)?;
            }
        }
        map.end()
    }
}

/// A directed data-flow relationship between two entity ids.
///
/// The ids are weak references: they may name entities that were never declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    source: String,
    target: String,
    label: String,
    attributes: Attributes,
    threat: Option<ThreatLabel>,
    predicted_threat: Option<ThreatLabel>,
}

impl Edge {
    /// Create a new Edge without a prediction.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
        attributes: Attributes,
        threat: Option<ThreatLabel>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
            attributes,
            threat,
            predicted_threat: None,
        }
    }

    /// Get the source entity id.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the target entity id.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get the relationship label, verbatim.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Get the ground-truth threat written in the source, if any.
    ///
    /// Used for evaluation only, never as classifier input.
    pub fn threat(&self) -> Option<&ThreatLabel> {
        self.threat.as_ref()
    }

    /// Get the classifier's prediction, once attached.
    pub fn predicted_threat(&self) -> Option<&ThreatLabel> {
        self.predicted_threat.as_ref()
    }

    /// Attach the classifier's prediction.
    pub fn set_predicted_threat(&mut self, threat: ThreatLabel) {
        self.predicted_threat = Some(threat);
    }

    /// Returns `true` if a prediction is attached and it is not "none".
    pub fn has_predicted_threat(&self) -> bool {
        self.predicted_threat
            .as_ref()
            .is_some_and(|threat| !threat.is_none())
    }
}
