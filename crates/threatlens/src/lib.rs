//! ThreatLens - threat classification for C4-PlantUML diagrams.
//!
//! A diagram source is read into entities and data-flow edges, every edge is
//! projected onto a fixed feature schema, an injected classifier predicts a
//! threat per edge, and the relationships with a threat are rewritten in the
//! source so the rendered diagram shows them.

pub mod annotate;
pub mod classify;
pub mod config;
pub mod evaluate;
pub mod recommend;
pub mod report;

mod error;

pub use threatlens_core::{diagram, edge, entity, features, threat};
pub use threatlens_parser::{ParsedDiagram, Span, error::Diagnostic};

pub use error::ThreatLensError;

use log::{debug, info, trace};

use threatlens_core::{
    diagram::Diagram,
    features::{FeatureRecord, normalize},
};

use classify::ThreatClassifier;
use config::AppConfig;
use evaluate::Evaluation;
use recommend::{RecommendationCatalog, Recommendations};
use report::AnalysisReport;

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct Analysis {
    diagram: Diagram,
    diagnostics: Vec<Diagnostic>,
    records: Vec<FeatureRecord>,
    annotated: String,
    evaluation: Option<Evaluation>,
    recommendations: Recommendations,
}

impl Analysis {
    /// The extracted diagram, with predictions attached to its edges.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Extraction diagnostics, ordered by source position.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The classifier input, one record per edge.
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// The annotated diagram source.
    pub fn annotated(&self) -> &str {
        &self.annotated
    }

    /// Agreement with the ground truth in the source, if it has any.
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub fn recommendations(&self) -> &Recommendations {
        &self.recommendations
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport::new(self)
    }
}

/// Runs diagram sources through extraction, classification and annotation.
///
/// # Examples
///
/// ```rust
/// use threatlens::{
///     ThreatAnalyzer,
///     classify::ClassifierError,
///     config::AppConfig,
///     features::FeatureRecord,
///     threat::ThreatLabel,
/// };
///
/// fn always_spoofing(records: &[FeatureRecord]) -> Result<Vec<ThreatLabel>, ClassifierError> {
///     Ok(vec![ThreatLabel::new("Spoofing"); records.len()])
/// }
///
/// let source = r#"
///     Person(user, "User", "Browses", "SourceType: User")
///     Container(web, "Web", "Shop", "SourceType: Web Application")
///     Rel(user, web, "Visits", "AuthRequired: No")
/// "#;
///
/// let analyzer = ThreatAnalyzer::new(AppConfig::default());
/// let analysis = analyzer.analyze(source, &always_spoofing).expect("analysis runs");
///
/// assert!(analysis.annotated().contains(r#"Rel(user, web, "Threat: Spoofing""#));
/// ```
#[derive(Debug, Default)]
pub struct ThreatAnalyzer {
    config: AppConfig,
    catalog: RecommendationCatalog,
}

impl ThreatAnalyzer {
    /// Create an analyzer with the given configuration and an empty catalog.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            catalog: RecommendationCatalog::default(),
        }
    }

    /// Create an analyzer and load the recommendation catalog named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ThreatLensError` if the configured catalog cannot be read or parsed.
    pub fn from_config(config: AppConfig) -> Result<Self, ThreatLensError> {
        let catalog = match config.recommendations().catalog() {
            Some(path) => RecommendationCatalog::load(path)?,
            None => RecommendationCatalog::default(),
        };
        Ok(Self { config, catalog })
    }

    /// Use `catalog` for recommendations.
    pub fn with_catalog(mut self, catalog: RecommendationCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Extract the diagram from `source` without classifying it.
    pub fn parse(&self, source: &str) -> ParsedDiagram {
        let parsed = threatlens_parser::parse(source);
        trace!(diagram:? = parsed.diagram(); "Parsed diagram");
        parsed
    }

    /// Run the full pipeline over `source`.
    ///
    /// All edges are classified in a single call. A diagram without edges
    /// is annotated unchanged and the classifier is not called.
    ///
    /// # Errors
    ///
    /// Returns [`ThreatLensError::SchemaMismatch`] if the classifier was fit
    /// with different columns, and [`ThreatLensError::Classifier`] if the
    /// classification call fails or returns the wrong number of labels.
    pub fn analyze(
        &self,
        source: &str,
        classifier: &dyn ThreatClassifier,
    ) -> Result<Analysis, ThreatLensError> {
        info!("Analyzing diagram");

        let (mut diagram, diagnostics) = self.parse(source).into_parts();
        debug!(
            entities = diagram.entities().len(),
            edges = diagram.edges().len(),
            warnings = diagnostics.len();
            "Diagram extracted",
        );

        let records = normalize(&diagram);
        let labels = classify::predict(classifier, &records)?;
        diagram.attach_predictions(labels);

        let annotated =
            annotate::annotate(source, diagram.edges(), self.config.annotation().style());
        let evaluation = Evaluation::from_edges(diagram.edges());
        let recommendations = self.catalog.recommendations_for(diagram.edges());

        info!("Analysis completed successfully");
        Ok(Analysis {
            diagram,
            diagnostics,
            records,
            annotated,
            evaluation,
            recommendations,
        })
    }
}
