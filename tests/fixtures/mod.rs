#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use lopdf::{dictionary, Document, Object, Stream};
use tamperscan::{
    DocumentMetadata, ExtractionError, MetadataReader, PageContent, PageRenderer,
};
use tempfile::TempDir;

/// Files generated on the fly into a temporary directory.
pub struct TestFixtures {
    dir: TempDir,
}

impl TestFixtures {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Uniform gray PNG; its quality score equals `level`.
    pub fn uniform_png(&self, name: &str, level: u8) -> PathBuf {
        let path = self.path(name);
        GrayImage::from_pixel(16, 16, Luma([level]))
            .save(&path)
            .expect("write png");
        path
    }

    /// High-contrast PNG that scores far above the default threshold.
    pub fn checkerboard_png(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        GrayImage::from_fn(16, 16, |x, y| if (x + y) % 2 == 0 { Luma([0]) } else { Luma([255]) })
            .save(&path)
            .expect("write png");
        path
    }

    /// JPEG carrying an EXIF Software tag (0x0131).
    pub fn jpeg_with_software(&self, name: &str, software: &str) -> PathBuf {
        let mut jpeg = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([180])))
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .expect("encode jpeg");
        let jpeg = jpeg.into_inner();

        let mut value = software.as_bytes().to_vec();
        value.push(0);

        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"MM\x00\x2A");
        tiff.extend_from_slice(&8u32.to_be_bytes());
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&0x0131u16.to_be_bytes());
        tiff.extend_from_slice(&2u16.to_be_bytes());
        tiff.extend_from_slice(&(value.len() as u32).to_be_bytes());
        tiff.extend_from_slice(&26u32.to_be_bytes());
        tiff.extend_from_slice(&0u32.to_be_bytes());
        tiff.extend_from_slice(&value);

        let mut app1 = vec![0xFF, 0xE1];
        app1.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
        app1.extend_from_slice(b"Exif\x00\x00");
        app1.extend_from_slice(&tiff);

        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&app1);
        bytes.extend_from_slice(&jpeg[2..]);

        let path = self.path(name);
        std::fs::write(&path, bytes).expect("write jpeg");
        path
    }

    /// One-page PDF with a text layer and the given Info entries.
    pub fn text_pdf(&self, name: &str, text: &str, info: &[(&str, &str)]) -> PathBuf {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let content = format!("BT /F1 12 Tf 72 700 Td ({}) Tj ET", text);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };
        self.finish_pdf(name, doc, content_id, resources, info)
    }

    /// One-page scanned PDF: a raw 8-bit gray image XObject and no text.
    pub fn scanned_pdf(&self, name: &str, level: u8, info: &[(&str, &str)]) -> PathBuf {
        self.image_pdf(name, 8, vec![level; 64], info)
    }

    /// One-page bilevel scan, 8x8 at one bit per pixel; each byte is a row.
    pub fn bilevel_pdf(&self, name: &str, rows: [u8; 8]) -> PathBuf {
        self.image_pdf(name, 1, rows.to_vec(), &[])
    }

    fn image_pdf(&self, name: &str, bpc: i64, samples: Vec<u8>, info: &[(&str, &str)]) -> PathBuf {
        let mut doc = Document::with_version("1.4");

        let mut scan = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 8i64,
                "Height" => 8i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => bpc,
            },
            samples,
        );
        scan.allows_compression = false;
        let scan_id = doc.add_object(Object::Stream(scan));

        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"q 612 0 0 792 0 0 cm /Im1 Do Q".to_vec(),
        ));
        let resources = dictionary! {
            "XObject" => dictionary! { "Im1" => scan_id },
        };
        self.finish_pdf(name, doc, content_id, resources, info)
    }

    fn finish_pdf(
        &self,
        name: &str,
        mut doc: Document,
        content_id: lopdf::ObjectId,
        resources: lopdf::Dictionary,
        info: &[(&str, &str)],
    ) -> PathBuf {
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0i64.into(), 0i64.into(), 612i64.into(), 792i64.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if !info.is_empty() {
            let mut dict = lopdf::Dictionary::new();
            for (key, value) in info {
                dict.set(*key, Object::string_literal(*value));
            }
            let info_id = doc.add_object(dict);
            doc.trailer.set("Info", info_id);
        }

        let path = self.path(name);
        doc.save(&path).expect("write pdf");
        path
    }

    pub fn pdf_metadata(entries: &[(&str, &str)]) -> DocumentMetadata {
        DocumentMetadata::Pdf(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn image_metadata(software: Option<&str>) -> DocumentMetadata {
        let mut tags = BTreeMap::new();
        if let Some(s) = software {
            tags.insert(305u16, s.to_string());
        }
        DocumentMetadata::Image(tags)
    }
}

/// Metadata reader returning the same canned metadata for any path.
pub struct CannedMetadata(pub DocumentMetadata);

impl MetadataReader for CannedMetadata {
    fn read_metadata(&self, _path: &Path) -> Result<DocumentMetadata, ExtractionError> {
        Ok(self.0.clone())
    }
}

/// Page renderer returning canned pages for any path.
pub struct CannedPages(pub Vec<PageContent>);

impl PageRenderer for CannedPages {
    fn render_pages(&self, _path: &Path) -> Result<Vec<PageContent>, ExtractionError> {
        Ok(self.0.clone())
    }
}

/// Metadata reader that always fails like a corrupt file would.
pub struct BrokenReader;

impl MetadataReader for BrokenReader {
    fn read_metadata(&self, path: &Path) -> Result<DocumentMetadata, ExtractionError> {
        Err(ExtractionError::PdfParsing {
            path: path.to_path_buf(),
            reason: "trailer not found".into(),
        })
    }
}
