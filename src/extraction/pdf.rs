//! PDF collaborators built on lopdf: Info dictionary metadata and
//! page-to-image extraction for OCR.
//!
//! Scanned PDFs carry each page as an image XObject; the largest image on a
//! page is taken as the page scan. Pages without any image fall back to
//! their embedded text layer.

use std::collections::BTreeMap;
use std::path::Path;

use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, instrument};

use super::{MetadataReader, PageContent, PageRenderer};
use crate::error::ExtractionError;
use crate::types::DocumentMetadata;

fn load_document(path: &Path) -> Result<Document, ExtractionError> {
    Document::load(path).map_err(|e| ExtractionError::PdfParsing {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Reads the trailer's /Info dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfInfoReader;

impl MetadataReader for PdfInfoReader {
    #[instrument(skip(self))]
    fn read_metadata(&self, path: &Path) -> Result<DocumentMetadata, ExtractionError> {
        let doc = load_document(path)?;
        let mut fields = BTreeMap::new();

        let info = match doc.trailer.get(b"Info") {
            Ok(obj) => resolve(&doc, obj).as_dict().ok(),
            Err(_) => None,
        };

        if let Some(info) = info {
            for (key, value) in info.iter() {
                let key = format!("/{}", String::from_utf8_lossy(key));
                fields.insert(key, object_text(resolve(&doc, value)));
            }
        }

        debug!(entries = fields.len(), "Read PDF Info dictionary");
        Ok(DocumentMetadata::Pdf(fields))
    }
}

/// Follows a single indirect reference; anything else is returned as is.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Renders an Info value the way a reader would show it.
fn object_text(obj: &Object) -> String {
    match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
        Object::Integer(i) => i.to_string(),
        Object::Boolean(b) => b.to_string(),
        other => format!("{:?}", other),
    }
}

/// UTF-16BE when the string carries a byte order mark, otherwise
/// PDFDocEncoding, approximated as Latin-1.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks(2)
            .map(|pair| u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| char::from(b)).collect()
    }
}

/// Extracts the page scan (or text layer) of every page, in page order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfPageRenderer;

impl PageRenderer for LopdfPageRenderer {
    #[instrument(skip(self))]
    fn render_pages(&self, path: &Path) -> Result<Vec<PageContent>, ExtractionError> {
        let doc = load_document(path)?;
        let mut pages = Vec::new();

        for (page_number, page_id) in doc.get_pages() {
            let render_err = |reason: String| ExtractionError::PageRendering {
                path: path.to_path_buf(),
                page: page_number,
                reason,
            };

            match largest_page_image(&doc, page_id) {
                Some(stream) => {
                    let image = decode_image_stream(&doc, stream).map_err(render_err)?;
                    debug!(
                        page = page_number,
                        width = image.width(),
                        height = image.height(),
                        "Extracted page scan"
                    );
                    pages.push(PageContent::Scan(image));
                }
                None => {
                    let text = doc.extract_text(&[page_number]).map_err(|e| {
                        render_err(format!("no scan image and no text layer: {}", e))
                    })?;
                    debug!(page = page_number, chars = text.len(), "Using embedded text layer");
                    pages.push(PageContent::TextLayer(text));
                }
            }
        }

        Ok(pages)
    }
}

/// Finds the page's /Resources, walking up /Parent for inherited ones.
fn page_resources<'a>(doc: &'a Document, page_id: ObjectId) -> Option<&'a Dictionary> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    loop {
        if let Ok(resources) = current.get(b"Resources") {
            return resolve(doc, resources).as_dict().ok();
        }
        let parent = current.get(b"Parent").ok()?;
        current = resolve(doc, parent).as_dict().ok()?;
    }
}

fn largest_page_image(doc: &Document, page_id: ObjectId) -> Option<&Stream> {
    let resources = page_resources(doc, page_id)?;
    let xobjects = resolve(doc, resources.get(b"XObject").ok()?).as_dict().ok()?;

    xobjects
        .iter()
        .filter_map(|(_, obj)| match resolve(doc, obj) {
            Object::Stream(stream) if is_image(&stream.dict) => Some(stream),
            _ => None,
        })
        .max_by_key(|stream| stream.content.len())
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn dict_int(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).ok().and_then(|obj| obj.as_i64().ok())
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn decode_image_stream(doc: &Document, stream: &Stream) -> Result<DynamicImage, String> {
    let mut filters = match stream.dict.get(b"Filter") {
        Ok(_) => stream
            .filters()
            .map_err(|e| format!("malformed /Filter: {}", e))?,
        Err(_) => Vec::new(),
    };
    let jpeg = filters.last().map(String::as_str) == Some("DCTDecode");
    if jpeg {
        filters.pop();
    }
    if let Some(other) = filters
        .iter()
        .find(|f| !matches!(f.as_str(), "FlateDecode" | "LZWDecode"))
    {
        return Err(format!("unsupported image filter: {}", other));
    }

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        inflate(stream, &filters)?
    };

    if jpeg {
        return image::load_from_memory_with_format(&data, image::ImageFormat::Jpeg)
            .map_err(|e| format!("JPEG scan could not be decoded: {}", e));
    }
    raw_pixels_to_image(doc, &stream.dict, &data)
}

/// Undoes the Flate/LZW layers of an image stream.
fn inflate(stream: &Stream, filters: &[String]) -> Result<Vec<u8>, String> {
    // lopdf only decompresses streams that are not tagged /Subtype /Image
    let mut plain = stream.clone();
    plain.dict.remove(b"Subtype");
    plain.dict.set(
        "Filter",
        Object::Array(
            filters
                .iter()
                .map(|f| Object::Name(f.as_bytes().to_vec()))
                .collect(),
        ),
    );
    plain
        .decompressed_content()
        .map_err(|e| format!("image data could not be decompressed: {}", e))
}

/// Colour models a raw image XObject can be rebuilt from.
#[derive(Debug, Clone, PartialEq)]
enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
    Indexed { base: Box<ColorModel>, hival: u8, palette: Vec<u8> },
}

impl ColorModel {
    fn components(&self) -> usize {
        match self {
            ColorModel::Gray | ColorModel::Indexed { .. } => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }

    fn from_image_dict(doc: &Document, dict: &Dictionary) -> Result<Self, String> {
        let mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
        if mask {
            return Ok(ColorModel::Gray);
        }
        let space = dict
            .get(b"ColorSpace")
            .map_err(|_| "image has no /ColorSpace".to_string())?;
        Self::parse(doc, space)
    }

    fn parse(doc: &Document, space: &Object) -> Result<Self, String> {
        match resolve(doc, space) {
            Object::Name(name) => match name.as_slice() {
                b"DeviceGray" | b"CalGray" | b"G" => Ok(ColorModel::Gray),
                b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ColorModel::Rgb),
                b"DeviceCMYK" | b"CMYK" => Ok(ColorModel::Cmyk),
                other => Err(format!(
                    "unsupported colour space: {}",
                    String::from_utf8_lossy(other)
                )),
            },
            Object::Array(parts) => {
                let family = parts
                    .first()
                    .and_then(|p| p.as_name().ok())
                    .ok_or("colour space array has no family name")?;
                match family {
                    b"ICCBased" => {
                        let profile = parts
                            .get(1)
                            .and_then(|p| resolve(doc, p).as_stream().ok())
                            .ok_or("ICCBased colour space has no profile stream")?;
                        match dict_int(&profile.dict, b"N") {
                            Some(1) => Ok(ColorModel::Gray),
                            Some(3) => Ok(ColorModel::Rgb),
                            Some(4) => Ok(ColorModel::Cmyk),
                            n => Err(format!("ICC profile with {:?} components", n)),
                        }
                    }
                    b"Indexed" | b"I" => Self::parse_indexed(doc, parts),
                    b"CalGray" => Ok(ColorModel::Gray),
                    b"CalRGB" => Ok(ColorModel::Rgb),
                    _ if parts.len() == 1 => Self::parse(doc, &parts[0]),
                    other => Err(format!(
                        "unsupported colour space: {}",
                        String::from_utf8_lossy(other)
                    )),
                }
            }
            _ => Err("malformed /ColorSpace".to_string()),
        }
    }

    fn parse_indexed(doc: &Document, parts: &[Object]) -> Result<Self, String> {
        let [_, base, hival, lookup] = parts else {
            return Err("Indexed colour space needs base, hival and lookup".to_string());
        };
        let base = Self::parse(doc, base)?;
        if matches!(base, ColorModel::Indexed { .. }) {
            return Err("Indexed colour space over an Indexed base".to_string());
        }
        let hival = resolve(doc, hival)
            .as_i64()
            .ok()
            .filter(|h| (0..=255).contains(h))
            .ok_or("Indexed hival out of range")? as u8;

        let palette = match resolve(doc, lookup) {
            Object::String(bytes, _) => bytes.clone(),
            Object::Stream(table) => table
                .decompressed_content()
                .unwrap_or_else(|_| table.content.clone()),
            _ => return Err("Indexed lookup table is neither a string nor a stream".to_string()),
        };
        let needed = (hival as usize + 1) * base.components();
        if palette.len() < needed {
            return Err(format!(
                "Indexed lookup holds {} bytes, expected {}",
                palette.len(),
                needed
            ));
        }

        Ok(ColorModel::Indexed {
            base: Box::new(base),
            hival,
            palette,
        })
    }
}

/// Reads sample `index` of a row packed at `bpc` bits per sample.
fn sample(row: &[u8], index: usize, bpc: usize) -> u16 {
    match bpc {
        8 => row[index] as u16,
        16 => u16::from_be_bytes([row[2 * index], row[2 * index + 1]]),
        _ => {
            let bit = index * bpc;
            let shift = 8 - bpc - bit % 8;
            ((row[bit / 8] >> shift) as u16) & ((1 << bpc) - 1)
        }
    }
}

fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64) -> [u8; 3] {
    let channel = |v: f64| ((1.0 - v) * (1.0 - k) * 255.0).round() as u8;
    [channel(c), channel(m), channel(y)]
}

fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Rebuilds an image from unfiltered samples using /Width, /Height,
/// /BitsPerComponent, /ColorSpace (or /ImageMask) and /Decode.
///
/// Rows are padded to a byte boundary. Colour spaces without a known
/// component count are rejected.
fn raw_pixels_to_image(
    doc: &Document,
    dict: &Dictionary,
    data: &[u8],
) -> Result<DynamicImage, String> {
    let width = dict_int(dict, b"Width").filter(|w| *w > 0).ok_or("image has no /Width")? as u32;
    let height = dict_int(dict, b"Height").filter(|h| *h > 0).ok_or("image has no /Height")? as u32;
    let model = ColorModel::from_image_dict(doc, dict)?;
    let bpc = match dict_int(dict, b"BitsPerComponent") {
        Some(b @ (1 | 2 | 4 | 8 | 16)) => b as usize,
        None if model == ColorModel::Gray => 1,
        other => return Err(format!("unsupported bits per component: {:?}", other)),
    };

    let comps = model.components();
    let max = ((1u32 << bpc) - 1) as f64;
    let row_len = (width as usize * comps * bpc + 7) / 8;
    if data.len() < row_len * height as usize {
        return Err(format!("pixel data too short for {}x{} image", width, height));
    }

    // /Decode maps each raw sample onto its component range
    let default_range = match model {
        ColorModel::Indexed { .. } => (0.0, max),
        _ => (0.0, 1.0),
    };
    let decode: Vec<f64> = dict
        .get(b"Decode")
        .and_then(Object::as_array)
        .map(|arr| arr.iter().filter_map(number).collect())
        .unwrap_or_default();
    let ranges: Vec<(f64, f64)> = (0..comps)
        .map(|c| match (decode.get(2 * c), decode.get(2 * c + 1)) {
            (Some(lo), Some(hi)) => (*lo, *hi),
            _ => default_range,
        })
        .collect();

    let mut gray = Vec::new();
    let mut rgb = Vec::new();
    let mut values = vec![0.0; comps];
    for row in data.chunks(row_len).take(height as usize) {
        for x in 0..width as usize {
            for (c, value) in values.iter_mut().enumerate() {
                let (lo, hi) = ranges[c];
                let raw = sample(row, x * comps + c, bpc) as f64;
                *value = lo + raw * (hi - lo) / max;
            }
            match &model {
                ColorModel::Gray => gray.push(to_byte(values[0])),
                ColorModel::Rgb => rgb.extend(values.iter().map(|v| to_byte(*v))),
                ColorModel::Cmyk => {
                    rgb.extend(cmyk_to_rgb(values[0], values[1], values[2], values[3]))
                }
                ColorModel::Indexed {
                    base,
                    hival,
                    palette,
                } => {
                    let index = (values[0].round().max(0.0) as usize).min(*hival as usize);
                    let entry = &palette[index * base.components()..][..base.components()];
                    match base.as_ref() {
                        ColorModel::Gray => gray.push(entry[0]),
                        ColorModel::Rgb => rgb.extend_from_slice(entry),
                        _ => {
                            let [c, m, y, k] =
                                [entry[0], entry[1], entry[2], entry[3]].map(|b| b as f64 / 255.0);
                            rgb.extend(cmyk_to_rgb(c, m, y, k));
                        }
                    }
                }
            }
        }
    }

    let image = if rgb.is_empty() {
        image::GrayImage::from_raw(width, height, gray).map(DynamicImage::ImageLuma8)
    } else {
        image::RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
    };
    image.ok_or_else(|| format!("pixel data too short for {}x{} image", width, height))
}
