//! Classifier adapter for a model served over HTTP.
//!
//! The whole batch is posted as one JSON document:
//!
//! ```json
//! {
//!   "columns": ["SourceType", "TargetType", "AuthRequired", "..."],
//!   "missing": "Missing",
//!   "rows": [["Web Application", "Database", "Yes", "..."]]
//! }
//! ```
//!
//! and the service answers with `{"labels": ["SQL Injection", ...]}` or a
//! bare array of label strings.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use threatlens_core::{
    features::{FEATURE_COLUMNS, FeatureRecord, MISSING},
    threat::ThreatLabel,
};

use super::{ClassifierError, ThreatClassifier};
use crate::{config::ClassifierConfig, error::ThreatLensError};

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    columns: Vec<&'static str>,
    missing: &'static str,
    rows: Vec<&'a [String]>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Labels { labels: Vec<String> },
    Bare(Vec<String>),
}

impl ClassifyResponse {
    fn into_labels(self) -> Vec<ThreatLabel> {
        let labels = match self {
            ClassifyResponse::Labels { labels } | ClassifyResponse::Bare(labels) => labels,
        };
        labels.into_iter().map(ThreatLabel::from).collect()
    }
}

fn transport_error(err: reqwest::Error) -> ClassifierError {
    if err.is_timeout() {
        ClassifierError::Timeout
    } else {
        ClassifierError::Transport(err.to_string())
    }
}

/// A [`ThreatClassifier`] that calls a remote inference endpoint.
///
/// Each call is a single blocking request bounded by the configured
/// timeout. Failed calls are not retried here; see
/// [`ClassifierError::is_retryable`].
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    columns: Option<Vec<String>>,
}

impl HttpClassifier {
    /// Create a classifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ThreatLensError::Config`] if no endpoint is configured and
    /// [`ThreatLensError::Classifier`] if the HTTP client cannot be built.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ThreatLensError> {
        let endpoint = config
            .endpoint()
            .ok_or_else(|| {
                ThreatLensError::Config(
                    "no classifier endpoint configured; set `classifier.endpoint`".to_string(),
                )
            })?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()
            .map_err(transport_error)?;

        debug!(endpoint, timeout_secs = config.timeout_secs(); "Created HTTP classifier");
        Ok(Self {
            client,
            endpoint,
            api_token: config.api_token().map(str::to_string),
            columns: config.columns().map(<[String]>::to_vec),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ThreatClassifier for HttpClassifier {
    fn expected_columns(&self) -> Option<Vec<String>> {
        self.columns.clone()
    }

    fn classify(&self, records: &[FeatureRecord]) -> Result<Vec<ThreatLabel>, ClassifierError> {
        let body = ClassifyRequest {
            columns: FEATURE_COLUMNS.iter().map(|column| column.name()).collect(),
            missing: MISSING,
            rows: records.iter().map(FeatureRecord::values).collect(),
        };

        info!(endpoint = self.endpoint, rows = records.len(); "Requesting classification");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(transport_error)?;
        let status = response.status();
        let text = response.text().map_err(transport_error)?;

        if !status.is_success() {
            warn!(status = status.as_u16(); "Classifier rejected the request");
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ClassifyResponse = serde_json::from_str(&text)
            .map_err(|err| ClassifierError::InvalidResponse(err.to_string()))?;
        Ok(parsed.into_labels())
    }
}
