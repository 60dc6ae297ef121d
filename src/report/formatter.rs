//! Report formatter implementation
//! Author: kartik4091
//! Created: 2025-06-05

use serde::{Deserialize, Serialize};

use super::sink::{begin_line, metadata_line};
use super::AnalysisReport;
use crate::error::{Error, Result};

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// The console transcript, line by line
    Text,
    Json,
}

/// Renders a finished report
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &AnalysisReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(Self::to_text(report)),
            ReportFormat::Json => Self::to_json(report),
        }
    }

    /// Same lines a [`super::ConsoleSink`] prints during the run.
    fn to_text(report: &AnalysisReport) -> String {
        let mut lines = vec![begin_line(&report.path)];
        if let Some(metadata) = &report.metadata {
            lines.push(metadata_line(metadata));
        }
        for signal in &report.signals {
            lines.extend(signal.lines());
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    fn to_json(report: &AnalysisReport) -> Result<String> {
        serde_json::to_string_pretty(report).map_err(|e| Error::ReportError(e.to_string()))
    }
}
