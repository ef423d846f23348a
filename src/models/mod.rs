// src/models/mod.rs

//! Domain models for the token pipeline.
//!
//! This module contains all data structures passed between the pipeline
//! stages, organized by their primary purpose.

mod config;
mod probe;
mod record;

// Re-export all public types
pub use config::{AuthConfig, Config, ExtractConfig, FetchConfig, PathsConfig, ProbeConfig};
pub use probe::{NO_STATUS_LINE, ProbeOutput, ProbeRecord, ProbeResult};
pub use record::{
    ChannelRecord, Identifier, NOT_FOUND, RecordEntry, ScrapedEntry, SignedUrl, StoredRecord,
};

use chrono::{DateTime, Utc};

/// Counters for one pipeline stage.
#[derive(Debug, Clone)]
pub struct StageStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl StageStats {
    /// Start counting from now.
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            processed: 0,
            succeeded: 0,
            failed: 0,
        }
    }

    /// Stamp the end time.
    pub fn finish(mut self) -> Self {
        self.end_time = Utc::now();
        self
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Items for a summary log block.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Processed", self.processed.to_string()),
            ("Succeeded", self.succeeded.to_string()),
            ("Failed", self.failed.to_string()),
            ("Elapsed", format!("{:.1}s", self.elapsed_secs())),
        ]
    }
}
