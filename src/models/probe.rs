// src/models/probe.rs

use serde::Serialize;

/// Status line reported when the probe printed nothing.
pub const NO_STATUS_LINE: &str = "No HTTP Status Line";

/// Raw outcome of one header-only request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Process exit code; `None` when killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProbeOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// First line of the captured headers.
    pub fn status_line(&self) -> &str {
        self.stdout
            .lines()
            .next()
            .map(|line| line.trim_end_matches('\r'))
            .unwrap_or(NO_STATUS_LINE)
    }
}

/// Classification of one probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeResult {
    Success {
        status_line: String,
    },
    Forbidden {
        status_line: String,
    },
    ProcessFailure {
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },
    ToolMissing,
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success { .. })
    }
}

/// A probed URL with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeRecord {
    pub url: String,
    #[serde(flatten)]
    pub result: ProbeResult,
}
