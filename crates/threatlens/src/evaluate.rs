//! Agreement between predicted threats and the ground truth written in the
//! diagram (`Threat: ...` in a relationship's details).

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use threatlens_core::edge::Edge;

/// Precision, recall and F1 for one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMetrics {
    label: String,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

impl LabelMetrics {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn recall(&self) -> f64 {
        self.recall
    }

    pub fn f1(&self) -> f64 {
        self.f1
    }

    /// Number of samples whose ground truth is this label.
    pub fn support(&self) -> usize {
        self.support
    }
}

#[derive(Debug, Default)]
struct Counts {
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Accuracy and per-label metrics over the edges that carry both a ground
/// truth and a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    samples: usize,
    correct: usize,
    accuracy: f64,
    labels: Vec<LabelMetrics>,
}

impl Evaluation {
    /// Evaluate predictions against ground truth.
    ///
    /// Labels are compared in canonical form, so every "none" spelling counts
    /// as `No Threat`. Returns `None` when no edge has both labels.
    pub fn from_edges(edges: &[Edge]) -> Option<Self> {
        let pairs: Vec<(&str, &str)> = edges
            .iter()
            .filter_map(|edge| {
                Some((
                    edge.threat()?.canonical(),
                    edge.predicted_threat()?.canonical(),
                ))
            })
            .collect();

        if pairs.is_empty() {
            debug!("No ground truth to evaluate against");
            return None;
        }

        let mut counts: BTreeMap<&str, Counts> = BTreeMap::new();
        let mut correct = 0;
        for &(truth, predicted) in &pairs {
            if truth == predicted {
                correct += 1;
                counts.entry(truth).or_default().true_positives += 1;
            } else {
                counts.entry(truth).or_default().false_negatives += 1;
                counts.entry(predicted).or_default().false_positives += 1;
            }
        }

        let labels = counts
            .into_iter()
            .map(|(label, counts)| {
                let precision = ratio(
                    counts.true_positives,
                    counts.true_positives + counts.false_positives,
                );
                let recall = ratio(
                    counts.true_positives,
                    counts.true_positives + counts.false_negatives,
                );
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                LabelMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support: counts.true_positives + counts.false_negatives,
                }
            })
            .collect();

        let evaluation = Self {
            samples: pairs.len(),
            correct,
            accuracy: ratio(correct, pairs.len()),
            labels,
        };
        debug!(samples = evaluation.samples, accuracy = evaluation.accuracy; "Evaluated predictions");
        Some(evaluation)
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Fraction of samples predicted correctly.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Per-label metrics, sorted by label.
    pub fn labels(&self) -> &[LabelMetrics] {
        &self.labels
    }

    pub fn label(&self, label: &str) -> Option<&LabelMetrics> {
        self.labels.iter().find(|metrics| metrics.label == label)
    }
}

#[cfg(test)]
mod tests {
    use threatlens_core::{edge::Attributes, threat::ThreatLabel};

    use super::*;

    fn edge(truth: Option<&str>, predicted: Option<&str>) -> Edge {
        let mut edge = Edge::new("a", "b", "l", Attributes::new(), truth.map(ThreatLabel::from));
        if let Some(predicted) = predicted {
            edge.set_predicted_threat(ThreatLabel::new(predicted));
        }
        edge
    }

    #[test]
    fn test_no_ground_truth() {
        assert!(Evaluation::from_edges(&[]).is_none());
        assert!(Evaluation::from_edges(&[edge(None, Some("DoS"))]).is_none());
        assert!(Evaluation::from_edges(&[edge(Some("DoS"), None)]).is_none());
    }

    #[test]
    fn test_metrics() {
        let edges = [
            edge(Some("SQL Injection"), Some("SQL Injection")),
            edge(Some("SQL Injection"), Some("Spoofing")),
            edge(Some("Spoofing"), Some("Spoofing")),
            edge(Some("none"), Some("No Threat")),
            edge(None, Some("Spoofing")),
        ];

        let evaluation = Evaluation::from_edges(&edges).unwrap();
        assert_eq!(evaluation.samples(), 4);
        assert_eq!(evaluation.correct(), 3);
        assert!((evaluation.accuracy() - 0.75).abs() < 1e-9);

        let names: Vec<&str> = evaluation.labels().iter().map(LabelMetrics::label).collect();
        assert_eq!(names, vec!["No Threat", "SQL Injection", "Spoofing"]);

        let sql = evaluation.label("SQL Injection").unwrap();
        assert!((sql.precision() - 1.0).abs() < 1e-9);
        assert!((sql.recall() - 0.5).abs() < 1e-9);
        assert!((sql.f1() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(sql.support(), 2);

        let spoofing = evaluation.label("Spoofing").unwrap();
        assert!((spoofing.precision() - 0.5).abs() < 1e-9);
        assert!((spoofing.recall() - 1.0).abs() < 1e-9);
        assert_eq!(spoofing.support(), 1);
    }

    #[test]
    fn test_label_never_predicted_has_zero_precision() {
        let edges = [edge(Some("DoS"), Some("Spoofing"))];
        let evaluation = Evaluation::from_edges(&edges).unwrap();

        let dos = evaluation.label("DoS").unwrap();
        assert_eq!(dos.precision(), 0.0);
        assert_eq!(dos.f1(), 0.0);
        assert_eq!(evaluation.label("Spoofing").unwrap().support(), 0);
    }
}
