//! Machine-readable summary of one analysis run.

use indexmap::IndexMap;
use serde::Serialize;

use threatlens_core::features::FeatureRecord;

use crate::{
    Analysis,
    error::ThreatLensError,
    evaluate::Evaluation,
    recommend::Recommendation,
};

/// One edge with its features and labels.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeReport {
    source: String,
    target: String,
    label: String,
    features: IndexMap<&'static str, String>,
    threat: Option<String>,
    predicted_threat: Option<String>,
}

impl EdgeReport {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Feature values keyed by column name, in schema order.
    pub fn features(&self) -> &IndexMap<&'static str, String> {
        &self.features
    }

    pub fn predicted_threat(&self) -> Option<&str> {
        self.predicted_threat.as_deref()
    }
}

fn features_by_name(record: &FeatureRecord) -> IndexMap<&'static str, String> {
    record
        .iter()
        .map(|(column, value)| (column.name(), value.to_string()))
        .collect()
}

/// Serializable report of an [`Analysis`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    edges: Vec<EdgeReport>,
    warnings: usize,
    evaluation: Option<Evaluation>,
    recommendations: Vec<Recommendation>,
    unmatched_threats: Vec<String>,
}

impl AnalysisReport {
    pub fn new(analysis: &Analysis) -> Self {
        let edges = analysis
            .diagram()
            .edges()
            .iter()
            .zip(analysis.records())
            .map(|(edge, record)| EdgeReport {
                source: edge.source().to_string(),
                target: edge.target().to_string(),
                label: edge.label().to_string(),
                features: features_by_name(record),
                threat: edge.threat().map(ToString::to_string),
                predicted_threat: edge.predicted_threat().map(ToString::to_string),
            })
            .collect();

        Self {
            edges,
            warnings: analysis.diagnostics().len(),
            evaluation: analysis.evaluation().cloned(),
            recommendations: analysis.recommendations().matched().to_vec(),
            unmatched_threats: analysis.recommendations().unmatched().to_vec(),
        }
    }

    pub fn edges(&self) -> &[EdgeReport] {
        &self.edges
    }

    /// Render the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ThreatLensError::Io`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ThreatLensError> {
        serde_json::to_string_pretty(self).map_err(|err| ThreatLensError::Io(err.into()))
    }
}
