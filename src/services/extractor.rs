// src/services/extractor.rs

//! Payload extraction and decoding.
//!
//! A payload page carries a `CHANNEL_KEY="premium<digits>"` assignment and a
//! quoted base64 blob of exactly [`BLOB_LEN`] characters. The blob decodes to
//! a JSON-like document holding three more base64 values:
//!
//! ```text
//! page ─► channel key
//!      └► blob ─► document ─► b_ts, b_rnd, b_sig
//! ```
//!
//! Each stage is a separate method returning a `Result`, and
//! [`PayloadExtractor::extract_entry`] chains them into a [`RecordEntry`].

use std::fmt;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{ChannelRecord, RecordEntry};
use crate::utils::encoding;

/// Exact length of the encoded blob.
pub const BLOB_LEN: usize = 292;

/// Nested values carried by the decoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    Ts,
    Rnd,
    Sig,
}

impl PayloadField {
    /// Key of the field inside the document and label in the record store.
    pub fn name(self) -> &'static str {
        match self {
            PayloadField::Ts => "b_ts",
            PayloadField::Rnd => "b_rnd",
            PayloadField::Sig => "b_sig",
        }
    }
}

impl fmt::Display for PayloadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text recovered from the encoded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument(String);

impl DecodedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extracts channel records from payload pages.
pub struct PayloadExtractor {
    strict: bool,
    key_pattern: Regex,
    blob_pattern: Regex,
    field_patterns: [(PayloadField, Regex); 3],
}

impl PayloadExtractor {
    /// Build an extractor. In `strict` mode any missing piece fails the record.
    pub fn new(strict: bool) -> Result<Self> {
        let field_pattern = |field: PayloadField| -> Result<(PayloadField, Regex)> {
            let re = Regex::new(&format!(r#""{}":"([A-Za-z0-9+/=]+)""#, field.name()))?;
            Ok((field, re))
        };

        Ok(Self {
            strict,
            key_pattern: Regex::new(r#"CHANNEL_KEY="(premium[0-9]+)""#)?,
            blob_pattern: Regex::new(&format!(r#""([A-Za-z0-9+/=]{{{BLOB_LEN}}})""#))?,
            field_patterns: [
                field_pattern(PayloadField::Ts)?,
                field_pattern(PayloadField::Rnd)?,
                field_pattern(PayloadField::Sig)?,
            ],
        })
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The `premium<digits>` channel key assigned in the page.
    pub fn channel_key(&self, payload: &str) -> Result<String> {
        self.key_pattern
            .captures(payload)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| AppError::not_found("CHANNEL_KEY"))
    }

    /// The first quoted base64 run of exactly [`BLOB_LEN`] characters.
    pub fn encoded_blob<'p>(&self, payload: &'p str) -> Result<&'p str> {
        self.blob_pattern
            .captures(payload)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| AppError::not_found(format!("{BLOB_LEN}-character base64 string")))
    }

    /// Decode the blob into UTF-8 text.
    pub fn decode_blob(&self, blob: &str) -> Result<DecodedDocument> {
        encoding::decode_base64_utf8(blob, "main base64 string").map(DecodedDocument)
    }

    /// The still-encoded value of one nested field.
    pub fn field(&self, document: &DecodedDocument, field: PayloadField) -> Option<String> {
        self.field_patterns
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, re)| re.captures(document.as_str()))
            .map(|caps| caps[1].to_string())
    }

    /// Run every stage, recording failures in the entry instead of returning them.
    ///
    /// A missing channel key does not stop the remaining stages; the store
    /// writes it as a placeholder.
    pub fn extract_entry(&self, payload: &str) -> RecordEntry {
        let channel_key = self.channel_key(payload).ok();

        let blob = match self.encoded_blob(payload) {
            Ok(blob) => blob,
            Err(_) => return RecordEntry::BlobNotFound { channel_key },
        };

        let document = match self.decode_blob(blob) {
            Ok(document) => document,
            Err(e) => {
                let detail = match e {
                    AppError::Decode { message, .. } => message,
                    other => other.to_string(),
                };
                return RecordEntry::DecodeFailed {
                    channel_key,
                    detail,
                };
            }
        };

        RecordEntry::Extracted(ChannelRecord {
            channel_key,
            ts: self.field(&document, PayloadField::Ts),
            rnd: self.field(&document, PayloadField::Rnd),
            sig: self.field(&document, PayloadField::Sig),
        })
    }

    /// Extract one payload, honoring strict mode.
    ///
    /// Lenient mode always yields an entry. Strict mode turns the first failed
    /// stage into an error.
    pub fn extract(&self, payload: &str) -> Result<RecordEntry> {
        let entry = self.extract_entry(payload);
        self.check(&entry)?;
        Ok(entry)
    }

    /// Apply strict mode to an already extracted entry.
    pub fn check(&self, entry: &RecordEntry) -> Result<()> {
        if self.strict {
            require_complete(entry)?;
        }
        Ok(())
    }
}

/// The complete record in `entry`, or the error of its first failed stage.
pub fn require_complete(entry: &RecordEntry) -> Result<&ChannelRecord> {
    match entry {
        RecordEntry::FetchFailed { .. } => Err(AppError::not_found("payload page")),
        RecordEntry::BlobNotFound { channel_key: None }
        | RecordEntry::DecodeFailed {
            channel_key: None, ..
        } => Err(AppError::not_found("CHANNEL_KEY")),
        RecordEntry::BlobNotFound { .. } => Err(AppError::not_found(format!(
            "{BLOB_LEN}-character base64 string"
        ))),
        RecordEntry::DecodeFailed { detail, .. } => {
            Err(AppError::decode("main base64 string", detail))
        }
        RecordEntry::Extracted(record) => match record.missing_fields().first() {
            Some(name) => Err(AppError::not_found(*name)),
            None => Ok(record),
        },
    }
}
