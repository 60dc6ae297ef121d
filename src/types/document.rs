use std::{collections::BTreeMap, fmt, path::Path};

use serde::{Deserialize, Serialize};

/// PDF Info dictionary key holding the creation timestamp
pub const PDF_CREATION_DATE: &str = "/CreationDate";
/// PDF Info dictionary key holding the last modification timestamp
pub const PDF_MOD_DATE: &str = "/ModDate";
/// EXIF tag id of the Software (editor identification) field
pub const EXIF_SOFTWARE_TAG: u16 = 305;

/// Document families recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
    Unsupported,
}

/// Which metadata consistency check applies to a document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetadataCheck {
    /// Compare /CreationDate against /ModDate
    Timestamps,
    /// Look for an editor name in the EXIF software tag
    EditorTag,
    None,
}

/// Per-kind dispatch table entry for the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub metadata_check: MetadataCheck,
    pub text_extraction: bool,
    pub quality_scoring: bool,
}

impl DocumentKind {
    /// Classifies a path by its (case-insensitive) extension only.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "pdf" => DocumentKind::Pdf,
            "jpg" | "jpeg" | "png" | "gif" => DocumentKind::Image,
            _ => DocumentKind::Unsupported,
        }
    }

    /// Stages run for this kind. Quality scoring is off for PDFs unless the
    /// caller opts in.
    pub fn capabilities(self) -> Capabilities {
        match self {
            DocumentKind::Pdf => Capabilities {
                metadata_check: MetadataCheck::Timestamps,
                text_extraction: true,
                quality_scoring: false,
            },
            DocumentKind::Image => Capabilities {
                metadata_check: MetadataCheck::EditorTag,
                text_extraction: true,
                quality_scoring: true,
            },
            DocumentKind::Unsupported => Capabilities {
                metadata_check: MetadataCheck::None,
                text_extraction: false,
                quality_scoring: false,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Image => "image",
            DocumentKind::Unsupported => "unsupported",
        }
    }
}

/// Metadata as handed over by the extraction collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "fields", rename_all = "lowercase")]
pub enum DocumentMetadata {
    /// PDF Info dictionary, keys with their leading slash (e.g. `/ModDate`)
    Pdf(BTreeMap<String, String>),
    /// EXIF fields keyed by numeric tag id
    Image(BTreeMap<u16, String>),
}

impl DocumentMetadata {
    /// Value of a PDF Info key; empty when absent or when this is image metadata.
    pub fn pdf_field(&self, key: &str) -> &str {
        match self {
            DocumentMetadata::Pdf(fields) => fields.get(key).map(String::as_str).unwrap_or(""),
            DocumentMetadata::Image(_) => "",
        }
    }

    /// Value of an EXIF tag; empty when absent or when this is PDF metadata.
    pub fn exif_tag(&self, tag: u16) -> &str {
        match self {
            DocumentMetadata::Image(tags) => tags.get(&tag).map(String::as_str).unwrap_or(""),
            DocumentMetadata::Pdf(_) => "",
        }
    }
}

impl fmt::Display for DocumentMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = match self {
            DocumentMetadata::Pdf(fields) => fields
                .iter()
                .map(|(k, v)| format!("{:?}: {:?}", k, v))
                .collect(),
            DocumentMetadata::Image(tags) => tags
                .iter()
                .map(|(k, v)| format!("{}: {:?}", k, v))
                .collect(),
        };
        write!(f, "{{{}}}", entries.join(", "))
    }
}

/// First occurrence of one lexical field pattern in the recognized text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatch {
    /// Substring exactly as it appeared in the text
    pub raw: Option<String>,
    /// Canonical form (digits only for account numbers, otherwise the raw text)
    pub normalized: Option<String>,
}

impl FieldMatch {
    pub fn found(raw: impl Into<String>, normalized: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            normalized: Some(normalized.into()),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_found(&self) -> bool {
        self.raw.is_some()
    }
}

/// The three field matches pulled out of one document's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub account_number: FieldMatch,
    pub date: FieldMatch,
    pub amount: FieldMatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(&PathBuf::from("a/statement.PDF")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(&PathBuf::from("scan.jpeg")), DocumentKind::Image);
        assert_eq!(DocumentKind::from_path(&PathBuf::from("scan.Gif")), DocumentKind::Image);
        assert_eq!(DocumentKind::from_path(&PathBuf::from("scan.tiff")), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_path(&PathBuf::from("README")), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_path(&PathBuf::from(".pdf")), DocumentKind::Unsupported);
    }

    #[test]
    fn test_pdf_skips_quality_scoring() {
        assert!(!DocumentKind::Pdf.capabilities().quality_scoring);
        assert!(DocumentKind::Image.capabilities().quality_scoring);
        assert!(!DocumentKind::Unsupported.capabilities().text_extraction);
    }

    #[test]
    fn test_missing_metadata_fields_are_empty() {
        let pdf = DocumentMetadata::Pdf(BTreeMap::new());
        assert_eq!(pdf.pdf_field(PDF_MOD_DATE), "");
        assert_eq!(pdf.exif_tag(EXIF_SOFTWARE_TAG), "");

        let mut tags = BTreeMap::new();
        tags.insert(EXIF_SOFTWARE_TAG, "GIMP 2.10".to_string());
        let image = DocumentMetadata::Image(tags);
        assert_eq!(image.exif_tag(EXIF_SOFTWARE_TAG), "GIMP 2.10");
        assert_eq!(image.pdf_field(PDF_CREATION_DATE), "");
    }

    #[test]
    fn test_metadata_display() {
        let mut fields = BTreeMap::new();
        fields.insert(PDF_CREATION_DATE.to_string(), "D:20230101".to_string());
        let dump = DocumentMetadata::Pdf(fields).to_string();
        assert_eq!(dump, r#"{"/CreationDate": "D:20230101"}"#);
        assert_eq!(DocumentMetadata::Image(BTreeMap::new()).to_string(), "{}");
    }
}
