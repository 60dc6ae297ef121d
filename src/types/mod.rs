// Type definitions shared by the extraction, analysis and reporting layers

pub mod document;

pub use document::*;
