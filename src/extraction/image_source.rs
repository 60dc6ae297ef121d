//! Raster image collaborators: EXIF tags via `kamadak-exif` and pixel
//! decoding via `image`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use image::DynamicImage;
use tracing::{debug, instrument};

use super::{ImageLoader, MetadataReader};
use crate::error::ExtractionError;
use crate::types::DocumentMetadata;

/// Reads primary-image EXIF fields keyed by numeric tag id.
///
/// GIFs and files without an EXIF block (most PNGs) give an empty map. A
/// damaged EXIF block is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifReader;

impl MetadataReader for ExifReader {
    #[instrument(skip(self))]
    fn read_metadata(&self, path: &Path) -> Result<DocumentMetadata, ExtractionError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        if let Ok(image::ImageFormat::Gif) = image::guess_format(reader.fill_buf()?) {
            debug!("GIF has no EXIF container");
            return Ok(DocumentMetadata::Image(BTreeMap::new()));
        }

        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(container)) => {
                debug!(container, "No EXIF block");
                return Ok(DocumentMetadata::Image(BTreeMap::new()));
            }
            Err(e) => {
                return Err(ExtractionError::ExifReading {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        let mut tags = BTreeMap::new();
        for field in exif.fields().filter(|f| f.ifd_num == exif::In::PRIMARY) {
            tags.entry(field.tag.number()).or_insert_with(|| field_text(field));
        }
        debug!(tags = tags.len(), "Read EXIF tags");
        Ok(DocumentMetadata::Image(tags))
    }
}

/// ASCII fields become plain text; everything else uses the EXIF display form.
fn field_text(field: &exif::Field) -> String {
    match field.value {
        exif::Value::Ascii(ref parts) => parts
            .iter()
            .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').to_string())
            .collect::<Vec<_>>()
            .join(" "),
        _ => field.display_value().to_string(),
    }
}

/// Decodes JPEG/PNG/GIF files (first frame for animations).
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImageLoader;

impl ImageLoader for RasterImageLoader {
    #[instrument(skip(self))]
    fn load_image(&self, path: &Path) -> Result<DynamicImage, ExtractionError> {
        let image = image::open(path).map_err(|e| ExtractionError::ImageDecoding {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(width = image.width(), height = image.height(), "Decoded image");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_png_without_exif_gives_empty_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        GrayImage::from_pixel(4, 4, Luma([10])).save(&path).unwrap();

        let metadata = ExifReader.read_metadata(&path).unwrap();
        assert_eq!(metadata, DocumentMetadata::Image(BTreeMap::new()));
    }

    #[test]
    fn test_gif_gives_empty_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.gif");
        RgbImage::from_pixel(4, 4, Rgb([10, 10, 10])).save(&path).unwrap();

        let metadata = ExifReader.read_metadata(&path).unwrap();
        assert_eq!(metadata, DocumentMetadata::Image(BTreeMap::new()));
    }

    #[test]
    fn test_damaged_exif_block_is_an_error() {
        let mut jpeg = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([180])))
            .write_to(&mut jpeg, image::ImageFormat::Jpeg)
            .unwrap();
        let jpeg = jpeg.into_inner();

        // APP1 segment whose TIFF header has no valid byte order
        let payload = b"Exif\x00\x00XXXXXXXXXXXX";
        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&[0xFF, 0xE1]);
        bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&jpeg[2..]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("damaged.jpg");
        std::fs::write(&path, bytes).unwrap();

        let err = ExifReader.read_metadata(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::ExifReading { .. }));
    }

    #[test]
    fn test_loader_round_trips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        GrayImage::from_pixel(3, 2, Luma([77])).save(&path).unwrap();

        let image = RasterImageLoader.load_image(&path).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.to_luma8().get_pixel(1, 1).0[0], 77);
    }

    #[test]
    fn test_undecodable_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let err = RasterImageLoader.load_image(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::ImageDecoding { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ExifReader.read_metadata(Path::new("/nonexistent/scan.jpg")).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }
}
