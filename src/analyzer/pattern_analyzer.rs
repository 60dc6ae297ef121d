//! Pattern analyzer implementation for recognized document text
//! Author: kartik4091
//! Created: 2025-06-03
//! Pulls candidate account numbers, dates and transaction amounts out of
//! OCR text with fixed lexical patterns. Only the first hit of each pattern
//! is kept; competing candidates are not reconciled.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};

use crate::types::{ExtractedFields, FieldMatch};

lazy_static! {
    /// 16 digits, optionally grouped 4-4-4-4 with a hyphen or space
    static ref ACCOUNT_NUMBER: Regex =
        Regex::new(r"\b[0-9]{4}[- ]?[0-9]{4}[- ]?[0-9]{4}[- ]?[0-9]{4}\b").unwrap();
    /// Year-first dates, YYYY-MM-DD or YYYY/MM/DD; no calendar validation
    static ref DATE: Regex = Regex::new(r"\b[0-9]{4}[-/][0-9]{2}[-/][0-9]{2}\b").unwrap();
    /// Any digit run with exactly two decimals
    static ref AMOUNT: Regex = Regex::new(r"\b[0-9]+\.[0-9]{2}\b").unwrap();
}

/// Strips the hyphen and space separators from an account number.
pub fn normalize_account_number(raw: &str) -> String {
    raw.chars().filter(|c| *c != '-' && *c != ' ').collect()
}

/// Stateless extractor for the three document fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldPatternExtractor;

impl FieldPatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Runs all three patterns over the text.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn extract(&self, text: &str) -> ExtractedFields {
        let fields = ExtractedFields {
            account_number: self.account_number(text),
            date: self.date(text),
            amount: self.amount(text),
        };
        debug!(
            account = fields.account_number.is_found(),
            date = fields.date.is_found(),
            amount = fields.amount.is_found(),
            "Field extraction finished"
        );
        fields
    }

    pub fn account_number(&self, text: &str) -> FieldMatch {
        match ACCOUNT_NUMBER.find(text) {
            Some(m) => FieldMatch::found(m.as_str(), normalize_account_number(m.as_str())),
            None => FieldMatch::not_found(),
        }
    }

    pub fn date(&self, text: &str) -> FieldMatch {
        first_match(&DATE, text)
    }

    pub fn amount(&self, text: &str) -> FieldMatch {
        first_match(&AMOUNT, text)
    }
}

fn first_match(pattern: &Regex, text: &str) -> FieldMatch {
    pattern
        .find(text)
        .map(|m| FieldMatch::found(m.as_str(), m.as_str()))
        .unwrap_or_default()
}
