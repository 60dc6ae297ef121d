//! Signal sinks: where diagnostics go while a run is in progress.

use std::path::Path;

use crate::types::DocumentMetadata;

use super::Signal;

/// Receives the transcript of one analysis run, stage by stage.
pub trait SignalSink {
    fn begin(&mut self, path: &Path);
    fn metadata(&mut self, metadata: &DocumentMetadata);
    fn signal(&mut self, signal: &Signal);
}

pub(crate) fn begin_line(path: &Path) -> String {
    format!("Processing file at {}", path.display())
}

pub(crate) fn metadata_line(metadata: &DocumentMetadata) -> String {
    format!("Metadata: {}", metadata)
}

/// Prints every line to stdout as soon as it is produced.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl SignalSink for ConsoleSink {
    fn begin(&mut self, path: &Path) {
        println!("{}", begin_line(path));
    }

    fn metadata(&mut self, metadata: &DocumentMetadata) {
        println!("{}", metadata_line(metadata));
    }

    fn signal(&mut self, signal: &Signal) {
        for line in signal.lines() {
            println!("{}", line);
        }
    }
}

/// Keeps the transcript in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub lines: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignalSink for CollectingSink {
    fn begin(&mut self, path: &Path) {
        self.lines.push(begin_line(path));
    }

    fn metadata(&mut self, metadata: &DocumentMetadata) {
        self.lines.push(metadata_line(metadata));
    }

    fn signal(&mut self, signal: &Signal) {
        self.lines.extend(signal.lines());
    }
}

/// Discards everything; used when only the final report matters.
#[derive(Debug, Default)]
pub struct NullSink;

impl SignalSink for NullSink {
    fn begin(&mut self, _path: &Path) {}
    fn metadata(&mut self, _metadata: &DocumentMetadata) {}
    fn signal(&mut self, _signal: &Signal) {}
}
