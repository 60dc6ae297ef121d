//! Main Library File for Document Tamper Diagnostics
//! Provides a stage-based analysis of scanned PDFs and images: metadata
//! consistency, OCR text fields and image quality, each reported as an
//! independent signal for a human reviewer.

// Configuration and Core Pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Collaborators: PDF, image, EXIF and OCR backends
pub mod extraction;

// Analysis stages
pub mod analyzer;

// Signals and report output
pub mod report;

// Shared Utilities
pub mod utils;

// Re-exports for crate consumers
pub use analyzer::{
    AccountStatus, AmountClass, FieldPatternExtractor, ImageQualityScorer, KnownAccountMatcher,
    MetadataConsistencyChecker, MetadataFinding, QualityMeasurements, SuspicionPolicy,
    TamperDecision, TamperDecisionPolicy, TransactionThresholdClassifier,
};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, ConfigError, Error, ExtractionError, Result};
pub use extraction::{
    ExifReader, ImageLoader, LopdfPageRenderer, MetadataReader, MockOcrEngine, PageContent,
    PageRenderer, PdfInfoReader, RasterImageLoader, TextRecognizer, UnavailableRecognizer,
};
#[cfg(feature = "ocr")]
pub use extraction::TesseractRecognizer;
pub use pipeline::{Collaborators, DocumentAnalyzer};
pub use report::{
    AnalysisReport, CollectingSink, ConsoleSink, NullSink, ReportFormat, ReportFormatter,
    Severity, Signal, SignalKind, SignalSink, Verdict,
};
pub use types::{DocumentKind, DocumentMetadata, ExtractedFields, FieldMatch};
pub use utils::init_logging;
