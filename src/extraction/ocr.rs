//! Text recognition backends.
//!
//! Real recognition needs the `ocr` feature (system libtesseract). Without
//! it the default recognizer refuses to run rather than pretending the
//! document holds no text.

use image::DynamicImage;
use tracing::debug;

use super::TextRecognizer;
use crate::error::ExtractionError;

/// Tesseract through its C API, English model. A fresh engine is created
/// per call; traineddata is looked up through `TESSDATA_PREFIX`.
#[cfg(feature = "ocr")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TesseractRecognizer;

#[cfg(feature = "ocr")]
const TESSERACT_LANG: &str = "eng";

#[cfg(feature = "ocr")]
impl TextRecognizer for TesseractRecognizer {
    #[tracing::instrument(
        skip(self, image),
        fields(width = image.width(), height = image.height())
    )]
    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractionError> {
        let mut png = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| ExtractionError::OcrProcessing(format!("PNG encoding failed: {}", e)))?;

        let tess = tesseract::Tesseract::new(None, Some(TESSERACT_LANG))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;
        let mut tess = tess
            .set_image_from_mem(png.get_ref())
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;
        let text = tess
            .get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        debug!(chars = text.len(), "Recognized text");
        Ok(text)
    }
}

/// Stand-in used when the binary was built without OCR support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

impl TextRecognizer for UnavailableRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, ExtractionError> {
        Err(ExtractionError::OcrUnavailable(
            "built without the `ocr` feature; rebuild with `--features ocr`".to_string(),
        ))
    }
}

/// Returns the same canned text for every image.
#[derive(Debug, Clone, Default)]
pub struct MockOcrEngine {
    text: String,
}

impl MockOcrEngine {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextRecognizer for MockOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractionError> {
        debug!(width = image.width(), height = image.height(), "Mock OCR");
        Ok(self.text.clone())
    }
}

/// Tesseract when compiled in, otherwise [`UnavailableRecognizer`].
pub fn default_recognizer() -> Box<dyn TextRecognizer> {
    #[cfg(feature = "ocr")]
    {
        Box::new(TesseractRecognizer)
    }
    #[cfg(not(feature = "ocr"))]
    {
        Box::new(UnavailableRecognizer)
    }
}
