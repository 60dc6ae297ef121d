//! Extraction collaborators.
//!
//! The analysis core only sees these narrow traits: metadata from a file,
//! pages from a PDF, pixels from an image file and text from pixels. The
//! production implementations wrap `lopdf`, `image`, `kamadak-exif` and
//! (behind the `ocr` feature) Tesseract; tests plug in canned fakes.

use std::path::Path;

use image::DynamicImage;

use crate::error::ExtractionError;
use crate::types::DocumentMetadata;

pub mod image_source;
pub mod ocr;
pub mod pdf;

pub use image_source::{ExifReader, RasterImageLoader};
pub use ocr::{default_recognizer, MockOcrEngine, UnavailableRecognizer};
#[cfg(feature = "ocr")]
pub use ocr::TesseractRecognizer;
pub use pdf::{LopdfPageRenderer, PdfInfoReader};

/// Reads the metadata block of a document file.
pub trait MetadataReader {
    fn read_metadata(&self, path: &Path) -> Result<DocumentMetadata, ExtractionError>;
}

/// What a single PDF page yields for text recognition.
#[derive(Debug, Clone)]
pub enum PageContent {
    /// A raster of the page, to be run through OCR
    Scan(DynamicImage),
    /// Text already embedded in the page (no scan image present)
    TextLayer(String),
}

/// Turns every page of a PDF into something text can be read from.
pub trait PageRenderer {
    fn render_pages(&self, path: &Path) -> Result<Vec<PageContent>, ExtractionError>;
}

/// Decodes an image file into a pixel buffer.
pub trait ImageLoader {
    fn load_image(&self, path: &Path) -> Result<DynamicImage, ExtractionError>;
}

/// Best-effort text recognition; no layout or confidence is surfaced.
pub trait TextRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractionError>;
}
