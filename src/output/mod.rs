//! Output module for rendering scan reports
//!
//! This module handles:
//! - Serializing reports as pretty JSON (the CLI's stdout format)
//! - Generating markdown reports

mod markdown;

pub use markdown::{format_markdown_report, generate_markdown_report};

use crate::scan::ScanReport;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// JSON envelope matching the HTTP API's success response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEnvelope<'a> {
    pub success: bool,
    pub scan_type: &'static str,
    #[serde(flatten)]
    pub report: &'a ScanReport,
}

impl<'a> ReportEnvelope<'a> {
    pub fn new(report: &'a ScanReport) -> Self {
        Self {
            success: true,
            scan_type: report.scan_type(),
            report,
        }
    }
}

/// Formats a report as pretty-printed JSON in the API envelope
pub fn format_json_report(report: &ScanReport) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(&ReportEnvelope::new(report))?)
}
