// src/storage/format.rs

//! Plain-text record store format.
//!
//! ```text
//!
//! Processing ID: 123
//! ==================================================
//! CHANNEL_KEY: premium123
//! b_ts: MTIz
//! b_rnd: YWJj
//! b_sig: eHl6
//! ```
//!
//! Absent values are written as `Not found`. Reading only yields blocks
//! whose key and three values are all present, so failed records are
//! dropped on the way back in.

use std::fmt::Write;

use regex::Regex;

use crate::error::Result;
use crate::models::{ChannelRecord, Identifier, NOT_FOUND, RecordEntry, ScrapedEntry, StoredRecord};
use crate::services::BLOB_LEN;

/// Width of the divider under each banner.
pub const DIVIDER_WIDTH: usize = 50;

/// Block layout of a record store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Blank line before each banner
    Batch,
    /// Single block, blank line after the channel key
    Single,
}

/// Render every entry as a block, in the given order.
pub fn serialize(entries: &[ScrapedEntry], layout: Layout) -> String {
    let mut out = String::new();
    for scraped in entries {
        write_block(&mut out, scraped.id, &scraped.entry, layout);
    }
    out
}

/// Append the block for one identifier.
pub fn write_block(out: &mut String, id: Identifier, entry: &RecordEntry, layout: Layout) {
    // Writing into a String cannot fail.
    let _ = write_block_inner(out, id, entry, layout);
}

fn write_block_inner(
    out: &mut String,
    id: Identifier,
    entry: &RecordEntry,
    layout: Layout,
) -> std::fmt::Result {
    if layout == Layout::Batch {
        out.push('\n');
    }
    writeln!(out, "Processing ID: {id}")?;
    writeln!(out, "{}", "=".repeat(DIVIDER_WIDTH))?;

    if layout == Layout::Single && entry.channel_key_missing() {
        return write_key_line(out, None, layout);
    }

    match entry {
        RecordEntry::FetchFailed { detail } => {
            writeln!(out, "Error during the web request for ID {id}: {detail}")?;
        }
        RecordEntry::BlobNotFound { channel_key } => {
            write_key_line(out, channel_key.as_deref(), layout)?;
            writeln!(out, "Error: {BLOB_LEN}-character base64 string not found.")?;
        }
        RecordEntry::DecodeFailed {
            channel_key,
            detail,
        } => {
            write_key_line(out, channel_key.as_deref(), layout)?;
            writeln!(out, "Error decoding the main base64 string: {detail}")?;
        }
        RecordEntry::Extracted(ChannelRecord {
            channel_key,
            ts,
            rnd,
            sig,
        }) => {
            write_key_line(out, channel_key.as_deref(), layout)?;
            for (label, value) in [("b_ts", ts), ("b_rnd", rnd), ("b_sig", sig)] {
                writeln!(out, "{label}: {}", value.as_deref().unwrap_or(NOT_FOUND))?;
            }
        }
    }
    Ok(())
}

fn write_key_line(out: &mut String, key: Option<&str>, layout: Layout) -> std::fmt::Result {
    writeln!(out, "CHANNEL_KEY: {}", key.unwrap_or(NOT_FOUND))?;
    if layout == Layout::Single {
        out.push('\n');
    }
    Ok(())
}

/// Reads fully-populated blocks back out of a record store file.
pub struct RecordParser {
    pattern: Regex,
}

impl RecordParser {
    pub fn new() -> Result<Self> {
        // Each value must fill the rest of its line, so `Not found` never matches.
        let pattern = Regex::new(concat!(
            r"(?m)CHANNEL_KEY:[ \t]*(premium[0-9]+)[ \t]*\r?$\s*",
            r"b_ts:[ \t]*([A-Za-z0-9+/=]+)[ \t]*\r?$\s*",
            r"b_rnd:[ \t]*([A-Za-z0-9+/=]+)[ \t]*\r?$\s*",
            r"b_sig:[ \t]*([A-Za-z0-9+/=]+)[ \t]*\r?$",
        ))?;
        Ok(Self { pattern })
    }

    /// Every matching block, in file order.
    pub fn parse(&self, text: &str) -> Vec<StoredRecord> {
        self.pattern
            .captures_iter(text)
            .map(|caps| StoredRecord {
                channel_key: caps[1].to_string(),
                ts_b64: caps[2].to_string(),
                rnd_b64: caps[3].to_string(),
                sig_b64: caps[4].to_string(),
            })
            .collect()
    }
}
