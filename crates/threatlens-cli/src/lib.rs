//! CLI logic for the ThreatLens annotator.
//!
//! This module contains the core CLI logic: load configuration, classify
//! the input diagram through the configured endpoint, and write the
//! annotated diagram plus an optional JSON report.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use threatlens::{ThreatAnalyzer, ThreatLensError, classify::HttpClassifier};
use threatlens_parser::error::Diagnostic;

use error_adapter::diagnostic_reportables;

/// Render extraction diagnostics through miette and log them.
fn report_diagnostics(source: &str, diagnostics: &[Diagnostic]) {
    let reporter = miette::GraphicalReportHandler::new();

    for reportable in diagnostic_reportables(diagnostics, source) {
        let mut writer = String::new();
        if reporter.render_report(&mut writer, &reportable).is_ok() {
            warn!("{writer}");
        } else {
            warn!("{reportable}");
        }
    }
}

/// Run the ThreatLens CLI application
///
/// Processes the input file through the analysis pipeline and writes the
/// annotated diagram to the output file.
///
/// # Errors
///
/// Returns `ThreatLensError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - A classifier that disagrees with the feature schema
/// - Classification failures
pub fn run(args: &Args) -> Result<(), ThreatLensError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(endpoint) = &args.endpoint {
        app_config = app_config.with_endpoint(endpoint.as_str());
    }

    let source = fs::read_to_string(&args.input)?;

    let classifier = HttpClassifier::new(app_config.classifier())?;
    let analyzer = ThreatAnalyzer::from_config(app_config)?;
    let analysis = analyzer.analyze(&source, &classifier)?;

    report_diagnostics(&source, analysis.diagnostics());

    fs::write(&args.output, analysis.annotated())?;
    info!(output_file = args.output; "Annotated diagram written");

    if let Some(evaluation) = analysis.evaluation() {
        info!(
            samples = evaluation.samples(),
            accuracy = evaluation.accuracy();
            "Predictions evaluated against ground truth"
        );
    }

    for threat in analysis.recommendations().unmatched() {
        warn!(threat = threat.as_str(); "No recommendation for threat");
    }

    if let Some(report_path) = &args.report {
        fs::write(report_path, analysis.report().to_json()?)?;
        info!(report_file = report_path.as_str(); "Analysis report written");
    }

    Ok(())
}
