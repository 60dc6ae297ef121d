//! Metadata Analyzer Implementation
//! Author: kartik4091
//! Created: 2025-06-03
//!
//! Consistency checks over extracted document metadata. PDFs compare the
//! creation and modification timestamps; images look for an editor name in
//! the EXIF software tag.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::types::{DocumentMetadata, EXIF_SOFTWARE_TAG, PDF_CREATION_DATE, PDF_MOD_DATE};

/// Outcome of a metadata consistency check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataFinding {
    /// Timestamps differ, or an editor was named
    PossibleEdit { evidence: String },
    NoEdit,
}

impl MetadataFinding {
    pub fn is_possible_edit(&self) -> bool {
        matches!(self, MetadataFinding::PossibleEdit { .. })
    }
}

/// Metadata consistency checker
#[derive(Debug, Clone)]
pub struct MetadataConsistencyChecker {
    editor_markers: Vec<String>,
}

impl MetadataConsistencyChecker {
    /// `editor_markers` are matched as lowercase substrings of the software tag.
    pub fn new(editor_markers: &[String]) -> Self {
        Self {
            editor_markers: editor_markers.iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    /// PDF variant. Missing fields count as empty strings, so a document
    /// carrying neither timestamp is reported as unedited.
    #[instrument(skip(self, metadata))]
    pub fn check_pdf(&self, metadata: &DocumentMetadata) -> MetadataFinding {
        let created = metadata.pdf_field(PDF_CREATION_DATE);
        let modified = metadata.pdf_field(PDF_MOD_DATE);
        debug!(
            created,
            modified,
            created_parsed = ?parse_pdf_date(created),
            modified_parsed = ?parse_pdf_date(modified),
            "Comparing PDF timestamps"
        );

        if created != modified {
            MetadataFinding::PossibleEdit {
                evidence: format!("CreationDate {:?} != ModDate {:?}", created, modified),
            }
        } else {
            MetadataFinding::NoEdit
        }
    }

    /// Image variant. Editors other than the configured markers go unnoticed.
    #[instrument(skip(self, metadata))]
    pub fn check_image(&self, metadata: &DocumentMetadata) -> MetadataFinding {
        let software = metadata.exif_tag(EXIF_SOFTWARE_TAG);
        let lowered = software.to_lowercase();
        debug!(software, "Inspecting EXIF software tag");

        if self.editor_markers.iter().any(|m| lowered.contains(m.as_str())) {
            MetadataFinding::PossibleEdit {
                evidence: software.to_string(),
            }
        } else {
            MetadataFinding::NoEdit
        }
    }
}

/// Parses a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`), tolerating any
/// suffix truncation. Used for diagnostics only; the consistency check
/// compares the raw strings.
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }

    let field = |start: usize, len: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + len) {
            Some(part) => part.parse().ok(),
            None => Some(default),
        }
    };
    let year: i32 = digits[0..4].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4, 2, 1)?, field(6, 2, 1)?)?;
    let naive: NaiveDateTime =
        date.and_hms_opt(field(8, 2, 0)?, field(10, 2, 0)?, field(12, 2, 0)?)?;

    let rest = &s[digits.len()..];
    let offset = parse_offset(rest)?;
    offset.from_local_datetime(&naive).single()
}

fn parse_offset(rest: &str) -> Option<FixedOffset> {
    let mut chars = rest.chars();
    let sign = match chars.next() {
        None | Some('Z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return FixedOffset::east_opt(0),
    };
    let digits: String = chars.filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = digits.get(0..2).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
