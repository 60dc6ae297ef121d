//! Tamper Analyzer Module
//! Author: kartik4091
//! Created: 2025-06-03 08:36:15 UTC
//!
//! The three independent analyzers (metadata consistency, text fields and
//! image quality) plus the classifiers and decision policies they feed.
//! Every analyzer here is pure: inputs in, finding out, no I/O.

pub mod classifier;
pub mod metadata_analyzer;
pub mod pattern_analyzer;
pub mod quality_analyzer;

pub use self::{
    classifier::{
        AccountStatus, AmountClass, KnownAccountMatcher, SuspicionPolicy,
        TransactionThresholdClassifier,
    },
    metadata_analyzer::{MetadataConsistencyChecker, MetadataFinding},
    pattern_analyzer::{normalize_account_number, FieldPatternExtractor},
    quality_analyzer::{
        to_grayscale, ImageQualityScorer, QualityMeasurements, TamperDecision,
        TamperDecisionPolicy,
    },
};
