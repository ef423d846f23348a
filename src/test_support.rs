//! Fixtures shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{AppError, Result};
use crate::models::{Identifier, ProbeOutput};
use crate::services::{PayloadFetcher, Prober};

/// Decoded length of a 292-character blob.
const DOCUMENT_LEN: usize = 219;

pub const FULL_FIELDS: &[(&str, &str)] = &[("b_ts", "MTIz"), ("b_rnd", "YWJj"), ("b_sig", "eHl6")];

/// A blob whose document carries `fields`, padded to the exact blob length.
pub fn blob_for(fields: &[(&str, &str)]) -> String {
    let mut prefix = String::from("{");
    for (name, value) in fields {
        prefix.push_str(&format!("\"{name}\":\"{value}\","));
    }
    prefix.push_str("\"pad\":\"");
    let suffix = "\"}";
    let pad = DOCUMENT_LEN - prefix.len() - suffix.len();
    let document = format!("{prefix}{}{suffix}", "x".repeat(pad));
    STANDARD.encode(document)
}

/// A payload page embedding an optional channel key and a blob.
pub fn page_for(channel_key: Option<&str>, blob: &str) -> String {
    let key_line = channel_key
        .map(|key| format!("var CHANNEL_KEY=\"{key}\";"))
        .unwrap_or_default();
    format!(
        "<html><head><script>{key_line}\nconst cfg = \"{blob}\";\n</script></head><body></body></html>"
    )
}

/// Serves canned pages; unknown identifiers fail like a 404.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<Identifier, String>,
}

impl FakeFetcher {
    pub fn with_page(mut self, id: Identifier, page: String) -> Self {
        self.pages.insert(id, page);
        self
    }
}

#[async_trait]
impl PayloadFetcher for FakeFetcher {
    async fn fetch(&self, id: Identifier) -> Result<String> {
        self.pages
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::fetch(id, "HTTP status client error (404 Not Found)"))
    }
}

/// Replays canned outputs per URL and records every call.
#[derive(Default)]
pub struct FakeProber {
    outputs: HashMap<String, ProbeOutput>,
    spawn_error: Option<std::io::ErrorKind>,
    pub calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeProber {
    pub fn missing_tool() -> Self {
        Self::failing_spawn(std::io::ErrorKind::NotFound)
    }

    /// Every call fails to start the program with `kind`.
    pub fn failing_spawn(kind: std::io::ErrorKind) -> Self {
        Self {
            spawn_error: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, url: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.outputs.insert(
            url.to_string(),
            ProbeOutput {
                exit_code: Some(exit_code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, url: &str, headers: &[(String, String)]) -> std::io::Result<ProbeOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), headers.to_vec()));
        if let Some(kind) = self.spawn_error {
            return Err(std::io::Error::new(kind, "cannot start probe program"));
        }
        Ok(self.outputs.get(url).cloned().unwrap_or(ProbeOutput {
            exit_code: Some(0),
            stdout: "HTTP/2 200\r\n".to_string(),
            stderr: String::new(),
        }))
    }
}
