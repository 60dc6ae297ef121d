//! Error types and handling for the tamper analysis library
//! Author: kartik4091
//! Created: 2025-06-03

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for tamper analysis operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for tamper analysis operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    ExtractionError(#[from] ExtractionError),

    #[error("Analysis error: {0}")]
    AnalysisError(#[from] AnalysisError),

    #[error("Report error: {0}")]
    ReportError(String),
}

// -------------------- Sub-Error Categories --------------------

/// Failures of the external collaborators (PDF parser, image decoder, OCR).
/// None of these are recovered locally; they end the run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExtractionError {
    #[error("Failed to parse PDF {path}: {reason}")]
    PdfParsing { path: PathBuf, reason: String },

    #[error("Failed to decode image {path}: {reason}")]
    ImageDecoding { path: PathBuf, reason: String },

    #[error("Failed to read EXIF data from {path}: {reason}")]
    ExifReading { path: PathBuf, reason: String },

    #[error("Page {page} of {path} could not be rendered: {reason}")]
    PageRendering {
        path: PathBuf,
        page: u32,
        reason: String,
    },

    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("OCR is not available: {0}")]
    OcrUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("Pixel buffer is empty")]
    EmptyImage,

    #[error("Transaction amount is not a number: {0}")]
    InvalidAmount(String),
}
