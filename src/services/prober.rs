// src/services/prober.rs

//! Header-only probing of signed URLs.

use std::io;

use async_trait::async_trait;
use tokio::process::Command;

use crate::models::{ProbeConfig, ProbeOutput, ProbeRecord, ProbeResult};
use crate::utils::console;

/// Issues one header-only request.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `url` with extra request headers.
    ///
    /// An `io::ErrorKind::NotFound` error means the tool is not installed.
    async fn probe(&self, url: &str, headers: &[(String, String)]) -> io::Result<ProbeOutput>;
}

/// Runs `curl -I` as a child process.
pub struct CurlProber {
    program: String,
    insecure: bool,
    max_time_secs: u64,
}

impl CurlProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            program: config.program.clone(),
            insecure: config.insecure,
            max_time_secs: config.max_time_secs,
        }
    }

    fn args(&self, url: &str, headers: &[(String, String)]) -> Vec<String> {
        let mut args = Vec::with_capacity(headers.len() * 2 + 5);
        if self.insecure {
            args.push("-k".to_string());
        }
        args.push("-I".to_string());
        if self.max_time_secs > 0 {
            args.push("--max-time".to_string());
            args.push(self.max_time_secs.to_string());
        }
        for (name, value) in headers {
            args.push("-H".to_string());
            args.push(format!("{name}: {value}"));
        }
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl Prober for CurlProber {
    async fn probe(&self, url: &str, headers: &[(String, String)]) -> io::Result<ProbeOutput> {
        let args = self.args(url, headers);
        log::debug!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program).args(&args).output().await?;
        Ok(ProbeOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Maps a finished probe to a [`ProbeResult`].
///
/// Only listed status lines are flagged as forbidden unless
/// `non_success_is_forbidden` is set; any other line counts as success.
#[derive(Debug, Clone, Default)]
pub struct StatusClassifier {
    forbidden_lines: Vec<String>,
    non_success_is_forbidden: bool,
}

impl StatusClassifier {
    pub fn new(forbidden_lines: Vec<String>, non_success_is_forbidden: bool) -> Self {
        Self {
            forbidden_lines,
            non_success_is_forbidden,
        }
    }

    /// Batch-mode classification from configuration.
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(
            config.forbidden_status_lines.clone(),
            config.non_success_is_forbidden,
        )
    }

    /// Every status line is a success.
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn classify(&self, output: &ProbeOutput) -> ProbeResult {
        if !output.succeeded() {
            return ProbeResult::ProcessFailure {
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
                stdout: output.stdout.trim().to_string(),
            };
        }

        let status_line = output.status_line().to_string();
        let forbidden = self.forbidden_lines.iter().any(|l| *l == status_line)
            || (self.non_success_is_forbidden && !is_2xx(&status_line));

        if forbidden {
            ProbeResult::Forbidden { status_line }
        } else {
            ProbeResult::Success { status_line }
        }
    }
}

/// Whether a status line such as `HTTP/2 204` carries a 2xx code.
fn is_2xx(status_line: &str) -> bool {
    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .is_some_and(|code| (200..300).contains(&code))
}

/// Probe results for one run.
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub records: Vec<ProbeRecord>,
}

impl ProbeReport {
    /// Whether the run stopped because the tool is not installed.
    pub fn tool_missing(&self) -> bool {
        matches!(
            self.records.last(),
            Some(ProbeRecord {
                result: ProbeResult::ToolMissing,
                ..
            })
        )
    }

    pub fn count(&self, pred: impl Fn(&ProbeResult) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.result)).count()
    }
}

/// Probes URLs one at a time with fixed headers.
pub struct ProbeRunner<'a> {
    prober: &'a dyn Prober,
    headers: Vec<(String, String)>,
    classifier: StatusClassifier,
}

impl<'a> ProbeRunner<'a> {
    pub fn new(
        prober: &'a dyn Prober,
        headers: Vec<(String, String)>,
        classifier: StatusClassifier,
    ) -> Self {
        Self {
            prober,
            headers,
            classifier,
        }
    }

    /// Headers sent with every probe.
    pub fn headers_from_config(config: &ProbeConfig, host: &str) -> Vec<(String, String)> {
        vec![
            ("user-agent".to_string(), config.user_agent.clone()),
            ("Host".to_string(), host.to_string()),
            ("origin".to_string(), config.origin.clone()),
            ("referer".to_string(), config.referer.clone()),
        ]
    }

    /// Probe every URL in order.
    ///
    /// A failing URL does not stop the run. A missing tool does: the report
    /// then ends with a [`ProbeResult::ToolMissing`] record.
    pub async fn run(&self, urls: &[String]) -> ProbeReport {
        let mut report = ProbeReport::default();

        for url in urls {
            log::info!("Probing: {url}");

            let result = match self.prober.probe(url, &self.headers).await {
                Ok(output) => self.classifier.classify(&output),
                Err(e) if e.kind() == io::ErrorKind::NotFound => ProbeResult::ToolMissing,
                Err(e) => ProbeResult::ProcessFailure {
                    exit_code: None,
                    stderr: e.to_string(),
                    stdout: String::new(),
                },
            };

            log_result(&result);
            let stop = matches!(result, ProbeResult::ToolMissing);
            report.records.push(ProbeRecord {
                url: url.clone(),
                result,
            });
            if stop {
                break;
            }
            console::separator();
        }

        report
    }
}

fn log_result(result: &ProbeResult) {
    match result {
        ProbeResult::Success { status_line } => log::info!("  SUCCESS. {status_line}"),
        ProbeResult::Forbidden { status_line } => log::warn!("  FAILED. {status_line}"),
        ProbeResult::ProcessFailure {
            exit_code,
            stderr,
            stdout,
        } => {
            match exit_code {
                Some(code) => log::warn!("  FAILED. Probe exited with code: {code}"),
                None => log::warn!("  FAILED. Probe did not run to completion"),
            }
            if !stderr.is_empty() {
                log::warn!("  Stderr: {stderr}");
            }
            if !stdout.is_empty() {
                log::warn!("  Stdout (headers): {stdout}");
            }
        }
        ProbeResult::ToolMissing => {
            log::error!("Probe tool not found. Aborting the remaining probes.")
        }
    }
}
