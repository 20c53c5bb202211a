//! Error types for ThreatLens operations.
//!
//! Extraction problems are never errors; they are reported as parser
//! diagnostics next to the diagram. [`ThreatLensError`] covers what stops a
//! pipeline run: the classifier disagreeing with the feature schema, the
//! classifier call itself failing, and I/O or configuration problems.

use std::io;

use thiserror::Error;

use crate::classify::ClassifierError;

/// The main error type for ThreatLens operations.
#[derive(Debug, Error)]
pub enum ThreatLensError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(
        "classifier expects columns [{}] but the feature schema is [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("classification failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ThreatLensError {
    /// Returns `true` if retrying the same run may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ThreatLensError::Classifier(err) => err.is_retryable(),
            ThreatLensError::Io(_)
            | ThreatLensError::SchemaMismatch { .. }
            | ThreatLensError::Config(_) => false,
        }
    }
}
