// src/pipeline/probe.rs

//! Probe stage: signed URL file → probe results.

use crate::error::{AppError, Result};
use crate::models::{Config, ProbeResult, StageStats};
use crate::services::{ProbeReport, ProbeRunner, Prober, StatusClassifier};
use crate::storage::LocalStorage;
use crate::utils::console;

/// Probe every URL listed in `urls_file`.
///
/// Per-URL failures are recorded in the report. A missing probe tool stops
/// the stage with [`AppError::ToolMissing`] after the report is saved.
pub async fn run_probe(
    config: &Config,
    storage: &LocalStorage,
    urls_file: &str,
    prober: &dyn Prober,
    classifier: StatusClassifier,
) -> Result<ProbeReport> {
    console::header("Probing auth URLs");
    let mut stats = StageStats::start();

    let urls = storage.read_lines(urls_file).await?;
    if urls.is_empty() {
        log::warn!("No URLs found in '{urls_file}'. Skipping probes.");
        return Ok(ProbeReport::default());
    }
    log::info!("Read {} URLs from '{}'", urls.len(), urls_file);

    let host = config
        .probe_host()
        .ok_or_else(|| AppError::config("Cannot derive a Host header for probes"))?;
    let headers = ProbeRunner::headers_from_config(&config.probe, &host);
    let report = ProbeRunner::new(prober, headers, classifier)
        .run(&urls)
        .await;

    if let Some(report_file) = &config.paths.probe_report {
        storage.write_json(report_file, &report.records).await?;
        log::info!("Probe report written to {}", storage.path(report_file).display());
    }

    stats.processed = report.records.len();
    stats.succeeded = report.count(ProbeResult::is_success);
    stats.failed = stats.processed - stats.succeeded;
    let stats = stats.finish();

    let mut items = stats.summary_items();
    items.insert(
        2,
        (
            "Forbidden",
            report
                .count(|r| matches!(r, ProbeResult::Forbidden { .. }))
                .to_string(),
        ),
    );
    console::summary("Probe", &items);

    if report.tool_missing() {
        return Err(AppError::ToolMissing {
            program: config.probe.program.clone(),
        });
    }
    Ok(report)
}
