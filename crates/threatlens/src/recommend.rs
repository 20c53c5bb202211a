//! Threat explanations and mitigations looked up by threat name.
//!
//! The catalog is a TOML file of `[[threat]]` tables:
//!
//! ```toml
//! [[threat]]
//! name = "SQL Injection"
//! explanation = "Untrusted input reaches a database query."
//! recommendation = "Use parameterized queries."
//! ```

use std::{fs, path::Path};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use threatlens_core::edge::Edge;

use crate::error::ThreatLensError;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Recommendation {
    name: String,
    explanation: String,
    recommendation: String,
}

impl Recommendation {
    pub fn new(
        name: impl Into<String>,
        explanation: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            explanation: explanation.into(),
            recommendation: recommendation.into(),
        }
    }

    /// The threat name this entry applies to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}

/// Result of looking up the predicted threats of a diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recommendations {
    matched: Vec<Recommendation>,
    unmatched: Vec<String>,
}

impl Recommendations {
    /// Entries for predicted threats, in the order the threats first appear.
    pub fn matched(&self) -> &[Recommendation] {
        &self.matched
    }

    /// Predicted threats the catalog has no entry for.
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    threat: Vec<Recommendation>,
}

/// A set of recommendations keyed by threat name.
#[derive(Debug, Clone, Default)]
pub struct RecommendationCatalog {
    entries: Vec<Recommendation>,
}

impl RecommendationCatalog {
    pub fn new(entries: Vec<Recommendation>) -> Self {
        Self { entries }
    }

    /// Parse a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ThreatLensError::Config`] if the text is not a valid catalog.
    pub fn from_toml(content: &str) -> Result<Self, ThreatLensError> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|err| ThreatLensError::Config(format!("invalid recommendation catalog: {err}")))?;
        debug!(entries = file.threat.len(); "Loaded recommendation catalog");
        Ok(Self::new(file.threat))
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`ThreatLensError::Io`] if the file cannot be read and
    /// [`ThreatLensError::Config`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ThreatLensError> {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading recommendation catalog");
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn entries(&self) -> &[Recommendation] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry for `threat`, ignoring case and surrounding whitespace.
    pub fn lookup(&self, threat: &str) -> Option<&Recommendation> {
        let threat = threat.trim();
        self.entries
            .iter()
            .find(|entry| entry.name.trim().eq_ignore_ascii_case(threat))
    }

    /// Look up every distinct predicted threat of `edges` that is not "none".
    pub fn recommendations_for(&self, edges: &[Edge]) -> Recommendations {
        let mut seen: Vec<String> = Vec::new();
        let mut recommendations = Recommendations::default();

        let threats = edges
            .iter()
            .filter_map(Edge::predicted_threat)
            .filter(|threat| !threat.is_none());

        for threat in threats {
            let name = threat.canonical();
            if seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                continue;
            }
            seen.push(name.to_string());

            match self.lookup(name) {
                Some(entry) => recommendations.matched.push(entry.clone()),
                None => recommendations.unmatched.push(name.to_string()),
            }
        }

        debug!(
            matched = recommendations.matched.len(),
            unmatched = recommendations.unmatched.len();
            "Looked up recommendations",
        );
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use threatlens_core::{edge::Attributes, threat::ThreatLabel};

    use super::*;

    const CATALOG: &str = r#"
[[threat]]
name = "SQL Injection"
explanation = "Untrusted input reaches a query."
recommendation = "Use parameterized queries."

[[threat]]
name = "Spoofing"
explanation = "An actor pretends to be another."
recommendation = "Authenticate both ends."
"#;

    fn predicted(threat: &str) -> Edge {
        let mut edge = Edge::new("a", "b", "l", Attributes::new(), None);
        edge.set_predicted_threat(ThreatLabel::new(threat));
        edge
    }

    #[test]
    fn test_lookup_ignores_case() {
        let catalog = RecommendationCatalog::from_toml(CATALOG).unwrap();
        assert_eq!(catalog.entries().len(), 2);
        assert_eq!(
            catalog.lookup("sql injection").map(Recommendation::recommendation),
            Some("Use parameterized queries.")
        );
        assert!(catalog.lookup("Tampering").is_none());
    }

    #[test]
    fn test_recommendations_in_first_seen_order() {
        let catalog = RecommendationCatalog::from_toml(CATALOG).unwrap();
        let edges = [
            predicted("Spoofing"),
            predicted("No Threat"),
            predicted("Tampering"),
            predicted("SQL Injection"),
            predicted("spoofing"),
        ];

        let recommendations = catalog.recommendations_for(&edges);

        let names: Vec<&str> = recommendations
            .matched()
            .iter()
            .map(Recommendation::name)
            .collect();
        assert_eq!(names, vec!["Spoofing", "SQL Injection"]);
        assert_eq!(recommendations.unmatched(), ["Tampering".to_string()]);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = RecommendationCatalog::from_toml("").unwrap();
        assert!(catalog.is_empty());
        let recommendations = catalog.recommendations_for(&[predicted("DoS")]);
        assert_eq!(recommendations.unmatched(), ["DoS".to_string()]);
    }

    #[test]
    fn test_invalid_catalog() {
        let err = RecommendationCatalog::from_toml("[[threat]]\nname = 3").unwrap_err();
        assert!(matches!(err, ThreatLensError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let catalog = RecommendationCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.entries().len(), 2);
    }
}
