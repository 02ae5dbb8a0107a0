//! Extraction statistics

use serde::Serialize;

/// Counters accumulated across one engine's lifetime
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractStats {
    /// Physical extractions performed (record cache misses)
    pub extractions: u64,
    /// Location/date folders processed
    pub folders_processed: u64,
    /// Locations skipped because their latest folder predates the
    /// configured start date, or had no usable date folder
    pub folders_skipped: u64,
    /// Files fetched from the remote (content cache misses)
    pub files_read: u64,
    /// Files that were missing or empty
    pub files_missing: u64,
    /// Files that could not be decoded and were skipped
    pub files_failed: u64,
    /// Records emitted to callers
    pub records_emitted: u64,
    /// Records dropped by primary key validation
    pub records_dropped: u64,
    /// Time spent in physical extractions, in milliseconds
    pub duration_ms: u64,
}

impl ExtractStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate extraction time
    pub fn add_duration(&mut self, ms: u64) {
        self.duration_ms += ms;
    }
}
