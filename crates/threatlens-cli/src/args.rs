//! Command-line argument definitions for the ThreatLens CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, the classifier endpoint and logging verbosity.

use clap::Parser;

/// Command-line arguments for the ThreatLens annotator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input C4-PlantUML file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the annotated output file
    #[arg(short, long, default_value = "annotated.puml")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Classifier endpoint, overriding the configured one
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Write a JSON analysis report to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
