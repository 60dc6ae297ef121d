//! Report module for document tamper analysis
//! Author: kartik4091
//! Created: 2025-06-05
//!
//! Each analyzer stage yields one or more [`Signal`]s. Signals are streamed
//! to a [`SignalSink`] while the run progresses and are also collected into
//! an [`AnalysisReport`]. The report deliberately carries no combined
//! verdict; [`AnalysisReport::summary`] only counts signals per verdict.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analyzer::QualityMeasurements;
use crate::types::{DocumentKind, DocumentMetadata, ExtractedFields};

pub mod formatter;
pub mod sink;

pub use formatter::{ReportFormat, ReportFormatter};
pub use sink::{CollectingSink, ConsoleSink, NullSink, SignalSink};

/// Line printed after every field signal judged as a likely edit
pub const EDIT_FOLLOW_UP: &str = "Document may be Edited.";

/// Per-signal verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    EditedLikely,
    NotEdited,
    Unknown,
}

/// Weight of a signal, as a hint for the reviewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

/// Which stage produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    MetadataConsistency,
    AccountNumber,
    Date,
    TransactionAmount,
    ImageQuality,
    UnsupportedFormat,
}

impl SignalKind {
    /// Field signals carry the edit follow-up line.
    pub fn is_field(self) -> bool {
        matches!(
            self,
            SignalKind::AccountNumber | SignalKind::Date | SignalKind::TransactionAmount
        )
    }
}

/// A single analyzer outcome with its human-readable statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub verdict: Verdict,
    pub severity: Severity,
    pub message: String,
}

impl Signal {
    pub fn new(
        kind: SignalKind,
        verdict: Verdict,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            verdict,
            severity,
            message: message.into(),
        }
    }

    /// Printed lines for this signal: the message, then the follow-up line
    /// for field signals judged as a likely edit.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.message.clone()];
        if self.kind.is_field() && self.verdict == Verdict::EditedLikely {
            lines.push(EDIT_FOLLOW_UP.to_string());
        }
        lines
    }
}

/// Signal counts per verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub edited_likely: usize,
    pub not_edited: usize,
    pub unknown: usize,
    pub total: usize,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub path: PathBuf,
    pub kind: DocumentKind,
    /// Absent for unsupported formats
    pub metadata: Option<DocumentMetadata>,
    /// Absent when no text extraction ran
    pub fields: Option<ExtractedFields>,
    /// One entry per scored image (or PDF page scan)
    pub quality: Vec<QualityMeasurements>,
    pub signals: Vec<Signal>,
    pub generated_at: String,
}

impl AnalysisReport {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            kind,
            metadata: None,
            fields: None,
            quality: Vec::new(),
            signals: Vec::new(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for signal in &self.signals {
            match signal.verdict {
                Verdict::EditedLikely => summary.edited_likely += 1,
                Verdict::NotEdited => summary.not_edited += 1,
                Verdict::Unknown => summary.unknown += 1,
            }
        }
        summary.total = self.signals.len();
        summary
    }

    pub fn signals_of(&self, kind: SignalKind) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(move |s| s.kind == kind)
    }

    /// Highest severity among the likely-edit signals, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.signals
            .iter()
            .filter(|s| s.verdict == Verdict::EditedLikely)
            .map(|s| s.severity)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(kind: SignalKind, verdict: Verdict, severity: Severity) -> Signal {
        Signal::new(kind, verdict, severity, "msg")
    }

    #[test]
    fn test_follow_up_only_on_flagged_field_signals() {
        let missing = Signal::new(
            SignalKind::AccountNumber,
            Verdict::EditedLikely,
            Severity::High,
            "Did not find an account number.",
        );
        assert_eq!(
            missing.lines(),
            vec!["Did not find an account number.", EDIT_FOLLOW_UP]
        );

        let metadata = signal(
            SignalKind::MetadataConsistency,
            Verdict::EditedLikely,
            Severity::Medium,
        );
        assert_eq!(metadata.lines().len(), 1);

        let known = signal(SignalKind::AccountNumber, Verdict::NotEdited, Severity::Info);
        assert_eq!(known.lines().len(), 1);
    }

    #[test]
    fn test_summary_counts_without_combining() {
        let mut report = AnalysisReport::new("scan.png", DocumentKind::Image);
        report.signals = vec![
            signal(SignalKind::MetadataConsistency, Verdict::NotEdited, Severity::Info),
            signal(SignalKind::AccountNumber, Verdict::EditedLikely, Severity::Medium),
            signal(SignalKind::Date, Verdict::Unknown, Severity::Info),
            signal(SignalKind::TransactionAmount, Verdict::EditedLikely, Severity::Low),
        ];

        let summary = report.summary();
        assert_eq!(summary.edited_likely, 2);
        assert_eq!(summary.not_edited, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.total, 4);
        assert_eq!(report.max_severity(), Some(Severity::Medium));
        assert_eq!(report.signals_of(SignalKind::Date).count(), 1);
    }

    #[test]
    fn test_empty_report() {
        let report = AnalysisReport::new("notes.txt", DocumentKind::Unsupported);
        assert_eq!(report.summary(), ReportSummary::default());
        assert_eq!(report.max_severity(), None);
        assert!(chrono::DateTime::parse_from_rfc3339(&report.generated_at).is_ok());
    }
}
