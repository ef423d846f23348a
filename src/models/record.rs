// src/models/record.rs

use std::fmt;

use serde::Serialize;

/// Numeric channel identifier taken from listing caches.
pub type Identifier = u64;

/// Placeholder written for a value the extractor could not find.
pub const NOT_FOUND: &str = "Not found";

/// Fields recovered from one payload page.
///
/// `None` marks a value that was absent; the store writes it as [`NOT_FOUND`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelRecord {
    pub channel_key: Option<String>,
    pub ts: Option<String>,
    pub rnd: Option<String>,
    pub sig: Option<String>,
}

impl ChannelRecord {
    /// Whether every field is present.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of the absent fields, in store order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("CHANNEL_KEY", &self.channel_key),
            ("b_ts", &self.ts),
            ("b_rnd", &self.rnd),
            ("b_sig", &self.sig),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// What happened to one identifier during a scrape, as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEntry {
    /// Payload decoded; fields may still be missing in lenient mode
    Extracted(ChannelRecord),
    /// No 292-character blob in the page
    BlobNotFound { channel_key: Option<String> },
    /// Blob was not valid base64 or not valid UTF-8
    DecodeFailed {
        channel_key: Option<String>,
        detail: String,
    },
    /// Request failed or returned a non-2xx status
    FetchFailed { detail: String },
}

impl RecordEntry {
    /// The record, if it carries all four fields.
    pub fn complete_record(&self) -> Option<&ChannelRecord> {
        match self {
            RecordEntry::Extracted(record) if record.is_complete() => Some(record),
            _ => None,
        }
    }

    /// Whether the page was read but carried no channel key.
    pub fn channel_key_missing(&self) -> bool {
        match self {
            RecordEntry::Extracted(record) => record.channel_key.is_none(),
            RecordEntry::BlobNotFound { channel_key }
            | RecordEntry::DecodeFailed { channel_key, .. } => channel_key.is_none(),
            RecordEntry::FetchFailed { .. } => false,
        }
    }
}

/// Result of scraping one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedEntry {
    pub id: Identifier,
    pub entry: RecordEntry,
}

/// A fully-populated block read back from the record store.
///
/// The three values are still base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRecord {
    pub channel_key: String,
    pub ts_b64: String,
    pub rnd_b64: String,
    pub sig_b64: String,
}

/// Auth endpoint URL carrying decoded timestamp, random and signature values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SignedUrl(String);

impl SignedUrl {
    pub(crate) fn compose(
        endpoint: &str,
        channel_key: &str,
        ts: &str,
        rnd: &str,
        sig: &str,
    ) -> Self {
        Self(format!(
            "{endpoint}?channel_id={channel_key}&ts={ts}&rnd={rnd}&sig={sig}"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
