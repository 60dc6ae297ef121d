//! Document Analysis Pipeline: Stage-by-Stage Execution
//! Author: kartik4091
//! Created: 2025-06-05
//!
//! Dispatches a file by extension, then runs metadata consistency, text
//! field extraction and (where the kind allows it) image quality scoring.
//! Each stage's signals are streamed to the sink as soon as they exist; a
//! collaborator failure ends the run and earlier lines stay printed.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info, instrument};

use crate::{
    analyzer::{
        AccountStatus, AmountClass, FieldPatternExtractor, ImageQualityScorer,
        KnownAccountMatcher, MetadataConsistencyChecker, MetadataFinding, TamperDecision,
        TamperDecisionPolicy, TransactionThresholdClassifier,
    },
    config::AnalysisConfig,
    error::Result,
    extraction::{
        default_recognizer, ExifReader, ImageLoader, LopdfPageRenderer, MetadataReader,
        PageContent, PageRenderer, PdfInfoReader, RasterImageLoader, TextRecognizer,
    },
    report::{AnalysisReport, Severity, Signal, SignalKind, SignalSink, Verdict},
    types::{DocumentKind, DocumentMetadata, ExtractedFields, FieldMatch, MetadataCheck},
};

/// The external services the analysis depends on.
pub struct Collaborators {
    pub pdf_metadata: Box<dyn MetadataReader>,
    pub image_metadata: Box<dyn MetadataReader>,
    pub pages: Box<dyn PageRenderer>,
    pub images: Box<dyn ImageLoader>,
    pub ocr: Box<dyn TextRecognizer>,
}

impl Default for Collaborators {
    /// lopdf, image and kamadak-exif backed readers; Tesseract when built
    /// with the `ocr` feature.
    fn default() -> Self {
        Self {
            pdf_metadata: Box::new(PdfInfoReader),
            image_metadata: Box::new(ExifReader),
            pages: Box::new(LopdfPageRenderer),
            images: Box::new(RasterImageLoader),
            ocr: default_recognizer(),
        }
    }
}

impl Collaborators {
    pub fn with_pdf_metadata(mut self, reader: impl MetadataReader + 'static) -> Self {
        self.pdf_metadata = Box::new(reader);
        self
    }

    pub fn with_image_metadata(mut self, reader: impl MetadataReader + 'static) -> Self {
        self.image_metadata = Box::new(reader);
        self
    }

    pub fn with_pages(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.pages = Box::new(renderer);
        self
    }

    pub fn with_images(mut self, loader: impl ImageLoader + 'static) -> Self {
        self.images = Box::new(loader);
        self
    }

    pub fn with_ocr(mut self, recognizer: impl TextRecognizer + 'static) -> Self {
        self.ocr = Box::new(recognizer);
        self
    }
}

/// Runs the tamper analysis for one document at a time.
pub struct DocumentAnalyzer {
    config: AnalysisConfig,
    collaborators: Collaborators,
}

impl DocumentAnalyzer {
    /// Analyzer with the production collaborators
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_collaborators(config, Collaborators::default())
    }

    pub fn with_collaborators(config: AnalysisConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Analyzes one file. Signals reach `sink` as each stage completes; the
    /// returned report holds all of them.
    #[instrument(skip(self, path, sink), fields(path = %path.display()))]
    pub fn analyze(&self, path: &Path, sink: &mut dyn SignalSink) -> Result<AnalysisReport> {
        info!("🚦 Starting document analysis");
        sink.begin(path);

        let kind = DocumentKind::from_path(path);
        let capabilities = kind.capabilities();
        let mut report = AnalysisReport::new(path, kind);
        debug!(kind = kind.label(), ?capabilities, "Dispatching");

        if kind == DocumentKind::Unsupported {
            emit(
                &mut report,
                sink,
                Signal::new(
                    SignalKind::UnsupportedFormat,
                    Verdict::Unknown,
                    Severity::Info,
                    "Unsupported file format.",
                ),
            );
            info!("⏭️ Unsupported file format, nothing analyzed");
            return Ok(report);
        }

        // Stage 1: Metadata consistency
        let metadata = self.stage_metadata(kind, path)?;
        sink.metadata(&metadata);
        if let Some(signal) = self.metadata_signal(capabilities.metadata_check, &metadata) {
            emit(&mut report, sink, signal);
        }
        report.metadata = Some(metadata);

        // Stage 2: Text fields
        let mut scans = Vec::new();
        if capabilities.text_extraction {
            let (text, images) = self.stage_text(kind, path)?;
            scans = images;
            let fields = FieldPatternExtractor::new().extract(&text);
            for signal in self.field_signals(&fields)? {
                emit(&mut report, sink, signal);
            }
            report.fields = Some(fields);
        }

        // Stage 3: Image quality
        if self.scores_quality(kind) {
            self.stage_quality(&scans, &mut report, sink)?;
        }

        info!(signals = report.signals.len(), "✅ Document analysis completed");
        Ok(report)
    }

    /// Quality scoring runs for images, and for PDF page scans only on request.
    fn scores_quality(&self, kind: DocumentKind) -> bool {
        kind.capabilities().quality_scoring
            || (kind == DocumentKind::Pdf && self.config.score_pdf_pages)
    }

    #[instrument(skip(self))]
    fn stage_metadata(&self, kind: DocumentKind, path: &Path) -> Result<DocumentMetadata> {
        info!("🏷️ Stage 1: Metadata extraction");
        let reader = match kind {
            DocumentKind::Pdf => &self.collaborators.pdf_metadata,
            _ => &self.collaborators.image_metadata,
        };
        Ok(reader.read_metadata(path)?)
    }

    fn metadata_signal(&self, check: MetadataCheck, metadata: &DocumentMetadata) -> Option<Signal> {
        let checker = MetadataConsistencyChecker::new(&self.config.editor_markers);
        let (verdict, severity, message) = match check {
            MetadataCheck::Timestamps => match checker.check_pdf(metadata) {
                MetadataFinding::PossibleEdit { .. } => (
                    Verdict::EditedLikely,
                    Severity::Medium,
                    "The document may have been edited after creation.".to_string(),
                ),
                MetadataFinding::NoEdit => (
                    Verdict::NotEdited,
                    Severity::Info,
                    "The document has not been edited after creation.".to_string(),
                ),
            },
            MetadataCheck::EditorTag => match checker.check_image(metadata) {
                MetadataFinding::PossibleEdit { evidence } => (
                    Verdict::EditedLikely,
                    Severity::Medium,
                    format!("The image may have been edited in {}.", evidence),
                ),
                MetadataFinding::NoEdit => (
                    Verdict::NotEdited,
                    Severity::Info,
                    "The image does not appear to have been edited.".to_string(),
                ),
            },
            MetadataCheck::None => return None,
        };
        Some(Signal::new(SignalKind::MetadataConsistency, verdict, severity, message))
    }

    /// Recognized text plus the images it was read from.
    #[instrument(skip(self))]
    fn stage_text(&self, kind: DocumentKind, path: &Path) -> Result<(String, Vec<DynamicImage>)> {
        info!("🔤 Stage 2: Text extraction");
        let ocr = &self.collaborators.ocr;

        match kind {
            DocumentKind::Pdf => {
                let mut texts = Vec::new();
                let mut scans = Vec::new();
                for page in self.collaborators.pages.render_pages(path)? {
                    match page {
                        PageContent::Scan(image) => {
                            texts.push(ocr.recognize(&image)?);
                            scans.push(image);
                        }
                        PageContent::TextLayer(text) => texts.push(text),
                    }
                }
                debug!(pages = texts.len(), scans = scans.len(), "PDF text collected");
                Ok((texts.join("\n"), scans))
            }
            _ => {
                let image = self.collaborators.images.load_image(path)?;
                let text = ocr.recognize(&image)?;
                Ok((text, vec![image]))
            }
        }
    }

    fn field_signals(&self, fields: &ExtractedFields) -> Result<Vec<Signal>> {
        let policy = &self.config.suspicion;
        let missing = |kind: SignalKind, message: &str| {
            if policy.suspects_missing() {
                Signal::new(kind, Verdict::EditedLikely, Severity::High, message)
            } else {
                Signal::new(kind, Verdict::Unknown, Severity::Info, message)
            }
        };

        let account = match fields.account_number.normalized.as_deref() {
            Some(number) => {
                let status = KnownAccountMatcher::new(&self.config.known_accounts).classify(number);
                match status {
                    AccountStatus::Known => Signal::new(
                        SignalKind::AccountNumber,
                        Verdict::NotEdited,
                        Severity::Info,
                        format!("Found a known account number: {}", number),
                    ),
                    AccountStatus::Unknown => {
                        let (verdict, severity) = if policy.suspects_account(status) {
                            (Verdict::EditedLikely, Severity::Medium)
                        } else {
                            (Verdict::Unknown, Severity::Info)
                        };
                        Signal::new(
                            SignalKind::AccountNumber,
                            verdict,
                            severity,
                            format!("Found an unknown account number: {}", number),
                        )
                    }
                }
            }
            None => missing(SignalKind::AccountNumber, "Did not find an account number."),
        };

        let date = match &fields.date {
            FieldMatch { raw: Some(date), .. } => Signal::new(
                SignalKind::Date,
                Verdict::Unknown,
                Severity::Info,
                format!("Found a date: {}", date),
            ),
            _ => missing(SignalKind::Date, "Did not find a date."),
        };

        let classifier = TransactionThresholdClassifier::new(self.config.transaction_limit);
        let classified = classifier.classify_match(&fields.amount)?;
        let amount = match (classified, fields.amount.raw.as_deref()) {
            (Some((_, AmountClass::Large)), Some(raw)) => Signal::new(
                SignalKind::TransactionAmount,
                Verdict::Unknown,
                Severity::Info,
                format!("Found a large transaction amount: {}", raw),
            ),
            (Some((_, class)), Some(raw)) => {
                let (verdict, severity) = if policy.suspects_amount(class) {
                    (Verdict::EditedLikely, Severity::Low)
                } else {
                    (Verdict::Unknown, Severity::Info)
                };
                Signal::new(
                    SignalKind::TransactionAmount,
                    verdict,
                    severity,
                    format!("Found a transaction amount: {}", raw),
                )
            }
            _ => missing(SignalKind::TransactionAmount, "Did not find a transaction amount."),
        };

        Ok(vec![account, date, amount])
    }

    #[instrument(skip(self, scans, report, sink), fields(images = scans.len()))]
    fn stage_quality(
        &self,
        scans: &[DynamicImage],
        report: &mut AnalysisReport,
        sink: &mut dyn SignalSink,
    ) -> Result<()> {
        info!("🔬 Stage 3: Image quality scoring");
        let scorer = ImageQualityScorer::new();
        let policy = TamperDecisionPolicy::new(self.config.quality_threshold);

        for scan in scans {
            let measurements = scorer.score_image(scan)?;
            let signal = match policy.decide(measurements.score) {
                TamperDecision::Tampered => Signal::new(
                    SignalKind::ImageQuality,
                    Verdict::EditedLikely,
                    Severity::Medium,
                    "Image is tampered.",
                ),
                TamperDecision::NotTampered => Signal::new(
                    SignalKind::ImageQuality,
                    Verdict::NotEdited,
                    Severity::Info,
                    "Image is not tampered.",
                ),
            };
            debug!(score = measurements.score, threshold = policy.threshold(), "Tamper decision");
            report.quality.push(measurements);
            emit(report, sink, signal);
        }
        Ok(())
    }
}

fn emit(report: &mut AnalysisReport, sink: &mut dyn SignalSink, signal: Signal) {
    sink.signal(&signal);
    report.signals.push(signal);
}
