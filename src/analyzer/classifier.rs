//! Field classifiers: known-account membership, transaction size, and the
//! policy that turns missing or weak fields into edit suspicions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::types::FieldMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Known,
    Unknown,
}

/// Membership test against the configured reference accounts.
#[derive(Debug, Clone, Copy)]
pub struct KnownAccountMatcher<'a> {
    known: &'a BTreeSet<String>,
}

impl<'a> KnownAccountMatcher<'a> {
    pub fn new(known: &'a BTreeSet<String>) -> Self {
        Self { known }
    }

    /// `normalized` must already be stripped of separators.
    pub fn classify(&self, normalized: &str) -> AccountStatus {
        if self.known.contains(normalized) {
            AccountStatus::Known
        } else {
            AccountStatus::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountClass {
    Large,
    Ordinary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionThresholdClassifier {
    limit: f64,
}

impl TransactionThresholdClassifier {
    pub fn new(limit: f64) -> Self {
        Self { limit }
    }

    /// Strictly greater than the limit is large; equal is ordinary.
    pub fn classify(&self, amount: f64) -> AmountClass {
        if amount > self.limit {
            AmountClass::Large
        } else {
            AmountClass::Ordinary
        }
    }

    /// Parses the matched token and classifies it.
    pub fn classify_match(
        &self,
        amount: &FieldMatch,
    ) -> Result<Option<(f64, AmountClass)>, AnalysisError> {
        let Some(token) = amount.normalized.as_deref() else {
            return Ok(None);
        };
        let value: f64 = token
            .parse()
            .map_err(|_| AnalysisError::InvalidAmount(token.to_string()))?;
        Ok(Some((value, self.classify(value))))
    }
}

/// Which field outcomes count as a sign of editing.
///
/// The defaults treat a missing field, an unknown account and an amount at
/// or under the limit all as "may be edited". Absence of evidence is thereby
/// read as evidence of tampering, so these flags exist to switch that off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionPolicy {
    pub flag_missing_fields: bool,
    pub flag_unknown_account: bool,
    pub flag_ordinary_amount: bool,
}

impl Default for SuspicionPolicy {
    fn default() -> Self {
        Self {
            flag_missing_fields: true,
            flag_unknown_account: true,
            flag_ordinary_amount: true,
        }
    }
}

impl SuspicionPolicy {
    /// Nothing but explicit metadata and quality evidence is flagged.
    pub fn lenient() -> Self {
        Self {
            flag_missing_fields: false,
            flag_unknown_account: false,
            flag_ordinary_amount: false,
        }
    }

    pub fn suspects_missing(&self) -> bool {
        self.flag_missing_fields
    }

    pub fn suspects_account(&self, status: AccountStatus) -> bool {
        status == AccountStatus::Unknown && self.flag_unknown_account
    }

    pub fn suspects_amount(&self, class: AmountClass) -> bool {
        class == AmountClass::Ordinary && self.flag_ordinary_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> BTreeSet<String> {
        ["1234567890123456", "0987654321098765"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_known_and_unknown_accounts() {
        let set = known();
        let matcher = KnownAccountMatcher::new(&set);
        assert_eq!(matcher.classify("1234567890123456"), AccountStatus::Known);
        assert_eq!(matcher.classify("0987654321098765"), AccountStatus::Known);
        assert_eq!(matcher.classify("1111222233334444"), AccountStatus::Unknown);
    }

    #[test]
    fn test_amount_threshold() {
        let classifier = TransactionThresholdClassifier::new(1000.00);
        assert_eq!(classifier.classify(1500.00), AmountClass::Large);
        assert_eq!(classifier.classify(50.00), AmountClass::Ordinary);
        assert_eq!(classifier.classify(1000.00), AmountClass::Ordinary);
    }

    #[test]
    fn test_classify_matched_token() {
        let classifier = TransactionThresholdClassifier::new(1000.00);
        let result = classifier
            .classify_match(&FieldMatch::found("1500.00", "1500.00"))
            .unwrap();
        assert_eq!(result, Some((1500.0, AmountClass::Large)));
        assert_eq!(classifier.classify_match(&FieldMatch::not_found()).unwrap(), None);
        assert!(classifier
            .classify_match(&FieldMatch::found("x", "1,5"))
            .is_err());
    }

    #[test]
    fn test_default_policy_flags_everything_weak() {
        let policy = SuspicionPolicy::default();
        assert!(policy.suspects_missing());
        assert!(policy.suspects_account(AccountStatus::Unknown));
        assert!(!policy.suspects_account(AccountStatus::Known));
        assert!(policy.suspects_amount(AmountClass::Ordinary));
        assert!(!policy.suspects_amount(AmountClass::Large));
    }

    #[test]
    fn test_lenient_policy_flags_nothing() {
        let policy = SuspicionPolicy::lenient();
        assert!(!policy.suspects_missing());
        assert!(!policy.suspects_account(AccountStatus::Unknown));
        assert!(!policy.suspects_amount(AmountClass::Ordinary));
    }
}
