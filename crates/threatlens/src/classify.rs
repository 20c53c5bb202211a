//! The classification boundary.
//!
//! Classification is an external capability: the pipeline hands a batch of
//! feature records to a [`ThreatClassifier`] and gets one label back per
//! record. The model itself (a remote service, an in-process model, a test
//! double) lives behind the trait.

mod http;

pub use http::HttpClassifier;

use log::{debug, info, trace};
use thiserror::Error;

use threatlens_core::{
    features::{FeatureRecord, column_names},
    threat::ThreatLabel,
};

use crate::error::ThreatLensError;

/// Errors raised at the classification boundary.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier did not answer within the configured timeout")]
    Timeout,

    #[error("classifier transport error: {0}")]
    Transport(String),

    #[error("classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("classifier response is malformed: {0}")]
    InvalidResponse(String),

    #[error("classifier returned {found} labels for {expected} records")]
    LabelCount { expected: usize, found: usize },

    #[error("classifier failed: {0}")]
    Model(String),
}

impl ClassifierError {
    /// Returns `true` for failures that may clear up on their own:
    /// timeouts, transport errors, server errors and rate limiting.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClassifierError::Timeout | ClassifierError::Transport(_) => true,
            ClassifierError::Status { status, .. } => *status >= 500 || *status == 429,
            ClassifierError::InvalidResponse(_)
            | ClassifierError::LabelCount { .. }
            | ClassifierError::Model(_) => false,
        }
    }
}

/// A model mapping feature records to threat labels.
///
/// Implementations receive every record of one diagram in a single call and
/// must return exactly one label per record, in order. Any
/// `Fn(&[FeatureRecord]) -> Result<Vec<ThreatLabel>, ClassifierError>` is a
/// classifier.
pub trait ThreatClassifier {
    /// The column names this classifier was fit with, if it advertises them.
    fn expected_columns(&self) -> Option<Vec<String>> {
        None
    }

    /// Classify a batch of records.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] if the model cannot produce labels.
    fn classify(&self, records: &[FeatureRecord]) -> Result<Vec<ThreatLabel>, ClassifierError>;
}

impl<F> ThreatClassifier for F
where
    F: Fn(&[FeatureRecord]) -> Result<Vec<ThreatLabel>, ClassifierError>,
{
    fn classify(&self, records: &[FeatureRecord]) -> Result<Vec<ThreatLabel>, ClassifierError> {
        self(records)
    }
}

/// Verify that `classifier` agrees with the feature schema.
///
/// Classifiers that do not advertise their columns are trusted.
pub fn check_schema(classifier: &dyn ThreatClassifier) -> Result<(), ThreatLensError> {
    let Some(expected) = classifier.expected_columns() else {
        debug!("Classifier does not advertise its columns");
        return Ok(());
    };

    let found = column_names();
    if expected != found {
        return Err(ThreatLensError::SchemaMismatch { expected, found });
    }
    Ok(())
}

/// Classify `records`, enforcing the one-label-per-record contract.
///
/// An empty batch is answered without calling the classifier.
pub(crate) fn predict(
    classifier: &dyn ThreatClassifier,
    records: &[FeatureRecord],
) -> Result<Vec<ThreatLabel>, ThreatLensError> {
    check_schema(classifier)?;

    if records.is_empty() {
        info!("No edges to classify");
        return Ok(Vec::new());
    }

    info!(records = records.len(); "Classifying edges");
    let labels = classifier.classify(records)?;

    if labels.len() != records.len() {
        return Err(ClassifierError::LabelCount {
            expected: records.len(),
            found: labels.len(),
        }
        .into());
    }

    trace!(labels:?; "Predicted labels");
    Ok(labels)
}
