//! Detail-string parsing.
//!
//! The detail string of a relationship is a flat list of `Key: Value`
//! pairs separated by commas:
//!
//! ```text
//! AuthRequired: Yes, Encryption: TLS, NetworkProtocol: HTTPS, Threat: Spoofing
//! ```
//!
//! Only keys from the attribute vocabulary and the `Threat` key are kept.

use log::trace;

use threatlens_core::{
    edge::{Attribute, Attributes},
    threat::ThreatLabel,
};

/// Key carrying the ground-truth threat label.
pub const THREAT_KEY: &str = "Threat";

/// The fields recovered from one detail string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Details {
    attributes: Attributes,
    threat: Option<ThreatLabel>,
}

impl Details {
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The ground-truth label from the `Threat` key, if present.
    pub fn threat(&self) -> Option<&ThreatLabel> {
        self.threat.as_ref()
    }

    pub fn into_parts(self) -> (Attributes, Option<ThreatLabel>) {
        (self.attributes, self.threat)
    }
}

/// Parse a detail string into attributes and a ground-truth label.
///
/// Segments without a `:`, with an empty key or value, or with a key outside
/// the vocabulary are dropped. When a key repeats, the first value is kept.
/// Values may contain `:` themselves; only the first one separates the key.
pub fn parse_details(details: &str) -> Details {
    let mut parsed = Details::default();

    for segment in details.split(',') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }

        if key == THREAT_KEY {
            if parsed.threat.is_none() {
                parsed.threat = Some(ThreatLabel::new(value));
            }
            continue;
        }

        match key.parse::<Attribute>() {
            Ok(attribute) if !parsed.attributes.contains(attribute) => {
                parsed.attributes.insert(attribute, value);
            }
            Ok(_) => trace!(key; "Ignoring repeated detail key"),
            Err(_) => trace!(key; "Ignoring unknown detail key"),
        }
    }

    parsed
}
