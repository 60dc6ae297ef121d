//! Utility Module Implementation
//! Author: kartik4091
//! Created: 2025-06-03
//!
//! Logging setup and the descriptive statistics used by the quality scorer.

pub mod logger;
pub mod statistics;

pub use self::{logger::init_logging, statistics::*};
