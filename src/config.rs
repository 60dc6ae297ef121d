//! Configuration types and validation for the analysis run
//! Author: kartik4091
//! Created: 2025-06-03

use std::{collections::BTreeSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::classifier::SuspicionPolicy;
use crate::analyzer::pattern_analyzer::normalize_account_number;
use crate::error::ConfigError;

/// Length of a normalized account number
pub const ACCOUNT_NUMBER_DIGITS: usize = 16;

/// Reference data and thresholds for a single analysis run.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Normalized (digits only) account numbers considered known-good
    pub known_accounts: BTreeSet<String>,
    /// Amounts strictly above this are reported as large
    pub transaction_limit: f64,
    /// Quality scores strictly below this are reported as tampered
    pub quality_threshold: f64,
    /// Lowercase substrings of the EXIF software tag that indicate an editor
    pub editor_markers: Vec<String>,
    /// Which outcomes raise the "may be edited" follow-up
    pub suspicion: SuspicionPolicy,
    /// Score rendered PDF pages as well as raster images
    pub score_pdf_pages: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            known_accounts: ["1234567890123456", "0987654321098765"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            transaction_limit: 1000.00,
            quality_threshold: 100.0,
            editor_markers: vec!["photoshop".into()],
            suspicion: SuspicionPolicy::default(),
            score_pdf_pages: false,
        }
    }
}

impl AnalysisConfig {
    /// Loads a config file, JSON first and YAML as fallback.
    /// Account numbers are normalized and the result is validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_str_any(&content)?;
        debug!(path = %path.display(), "Loaded analysis config");
        Ok(config)
    }

    /// Parses JSON or YAML text into a normalized, validated config.
    pub fn from_str_any(content: &str) -> Result<Self, ConfigError> {
        let parsed: Self = serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = parsed.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Strips separators from account numbers and lowercases editor markers.
    pub fn normalized(mut self) -> Self {
        self.known_accounts = self
            .known_accounts
            .iter()
            .map(|a| normalize_account_number(a))
            .collect();
        self.editor_markers = self
            .editor_markers
            .iter()
            .map(|m| m.trim().to_lowercase())
            .collect();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for account in &self.known_accounts {
            let digits_only = account.bytes().all(|b| b.is_ascii_digit());
            if account.len() != ACCOUNT_NUMBER_DIGITS || !digits_only {
                return Err(ConfigError::Invalid(format!(
                    "known account {:?} is not a {}-digit number",
                    account, ACCOUNT_NUMBER_DIGITS
                )));
            }
        }
        if !self.transaction_limit.is_finite() || self.transaction_limit < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "transaction limit must be a non-negative number, got {}",
                self.transaction_limit
            )));
        }
        if !self.quality_threshold.is_finite() {
            return Err(ConfigError::Invalid("quality threshold must be finite".into()));
        }
        if self.editor_markers.iter().any(|m| m.is_empty()) {
            return Err(ConfigError::Invalid("editor markers must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transaction_limit, 1000.00);
        assert_eq!(config.quality_threshold, 100.0);
        assert!(!config.score_pdf_pages);
    }

    #[test]
    fn test_json_config_with_grouped_accounts() {
        let json = r#"{ "known_accounts": ["1111-2222-3333-4444"], "transaction_limit": 250.0 }"#;
        let config = AnalysisConfig::from_str_any(json).unwrap();
        assert!(config.known_accounts.contains("1111222233334444"));
        assert_eq!(config.transaction_limit, 250.0);
        // unspecified fields keep their defaults
        assert_eq!(config.editor_markers, vec!["photoshop".to_string()]);
    }

    #[test]
    fn test_yaml_fallback() {
        let yaml = "editor_markers:\n  - GIMP\n  - Photoshop\nscore_pdf_pages: true\n";
        let config = AnalysisConfig::from_str_any(yaml).unwrap();
        assert_eq!(config.editor_markers, vec!["gimp".to_string(), "photoshop".to_string()]);
        assert!(config.score_pdf_pages);
    }

    #[test]
    fn test_rejects_short_account() {
        let json = r#"{ "known_accounts": ["12345"] }"#;
        assert!(matches!(
            AnalysisConfig::from_str_any(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_negative_limit() {
        let config = AnalysisConfig {
            transaction_limit: -1.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unparsable_text() {
        assert!(matches!(
            AnalysisConfig::from_str_any("known_accounts: [unterminated"),
            Err(ConfigError::Parse(_))
        ));
    }
}
