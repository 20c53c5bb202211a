//! Configuration types for ThreatLens runs.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration.
//! - [`ClassifierConfig`] - Where and how to reach the threat classifier.
//! - [`AnnotationConfig`] - How annotated relationships are styled.
//! - [`RecommendationConfig`] - Where the recommendation catalog lives.
//!
//! # Example
//!
//! ```
//! # use threatlens::config::AppConfig;
//! let config: AppConfig = toml::from_str(r#"
//!     [classifier]
//!     endpoint = "http://localhost:8080/classify"
//!     timeout_secs = 5
//!
//!     [annotation]
//!     style = '$lineColor="red"'
//! "#).unwrap();
//!
//! assert_eq!(config.classifier().timeout_secs(), 5);
//! assert_eq!(config.annotation().style(), "$lineColor=\"red\"");
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::annotate::DEFAULT_STYLE;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Classifier section.
    #[serde(default)]
    classifier: ClassifierConfig,

    /// Annotation section.
    #[serde(default)]
    annotation: AnnotationConfig,

    /// Recommendation catalog section.
    #[serde(default)]
    recommendations: RecommendationConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        classifier: ClassifierConfig,
        annotation: AnnotationConfig,
        recommendations: RecommendationConfig,
    ) -> Self {
        Self {
            classifier,
            annotation,
            recommendations,
        }
    }

    /// Returns the classifier configuration.
    pub fn classifier(&self) -> &ClassifierConfig {
        &self.classifier
    }

    /// Returns the annotation configuration.
    pub fn annotation(&self) -> &AnnotationConfig {
        &self.annotation
    }

    /// Returns the recommendation configuration.
    pub fn recommendations(&self) -> &RecommendationConfig {
        &self.recommendations
    }

    /// Replace the classifier endpoint, keeping every other setting.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.classifier = self.classifier.with_endpoint(endpoint);
        self
    }
}

/// Connection settings for an HTTP classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// URL the feature batch is posted to.
    #[serde(default)]
    endpoint: Option<String>,

    /// Upper bound for one classification request, in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Sent as a bearer token when set.
    #[serde(default)]
    api_token: Option<String>,

    /// The columns the model was fit with. When set, they are checked
    /// against the feature schema before any request is made.
    #[serde(default)]
    columns: Option<Vec<String>>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_token: None,
            columns: None,
        }
    }
}

impl ClassifierConfig {
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }
}

/// Styling of annotated relationships.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationConfig {
    /// Style arguments appended verbatim after the threat label.
    #[serde(default = "default_style")]
    style: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
        }
    }
}

impl AnnotationConfig {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
        }
    }

    pub fn style(&self) -> &str {
        &self.style
    }
}

/// Location of the threat recommendation catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationConfig {
    /// Path to a TOML catalog; no recommendations are produced when unset.
    #[serde(default)]
    catalog: Option<PathBuf>,
}

impl RecommendationConfig {
    pub fn new(catalog: impl Into<PathBuf>) -> Self {
        Self {
            catalog: Some(catalog.into()),
        }
    }

    pub fn catalog(&self) -> Option<&Path> {
        self.catalog.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.classifier().endpoint(), None);
        assert_eq!(config.classifier().timeout_secs(), 30);
        assert_eq!(config.annotation().style(), DEFAULT_STYLE);
        assert!(config.recommendations().catalog().is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.classifier().timeout_secs(), 30);
        assert_eq!(config.annotation().style(), DEFAULT_STYLE);
    }

    #[test]
    fn test_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [classifier]
            endpoint = "https://models.internal/threats"
            api_token = "t0k3n"
            columns = ["SourceType", "TargetType"]

            [recommendations]
            catalog = "threats.toml"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.classifier().endpoint(),
            Some("https://models.internal/threats")
        );
        assert_eq!(config.classifier().api_token(), Some("t0k3n"));
        assert_eq!(config.classifier().columns().map(<[String]>::len), Some(2));
        assert_eq!(
            config.recommendations().catalog(),
            Some(Path::new("threats.toml"))
        );
    }

    #[test]
    fn test_endpoint_override_keeps_other_settings() {
        let config: AppConfig = toml::from_str("[classifier]\ntimeout_secs = 3").unwrap();
        let config = config.with_endpoint("http://localhost:1234");

        assert_eq!(config.classifier().endpoint(), Some("http://localhost:1234"));
        assert_eq!(config.classifier().timeout_secs(), 3);
    }
}
