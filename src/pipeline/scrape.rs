// src/pipeline/scrape.rs

//! Scrape stage: listing caches → payload pages → record store.

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{Config, Identifier, RecordEntry, ScrapedEntry, StageStats};
use crate::services::{IdentifierCollector, PayloadExtractor, PayloadFetcher};
use crate::storage::{Layout, LocalStorage, format};
use crate::utils::console;

/// Entries written by a scrape run, in identifier order.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub entries: Vec<ScrapedEntry>,
    pub stats: StageStats,
}

/// Collect identifiers from the configured listing files.
pub async fn run_collect(config: &Config, storage: &LocalStorage) -> Result<Vec<Identifier>> {
    let paths: Vec<_> = config
        .paths
        .listing_files
        .iter()
        .map(|name| storage.path(name))
        .collect();

    let ids = IdentifierCollector::new()?.collect(&paths).await;
    log::info!(
        "Collected {} identifiers from {} listing files",
        ids.len(),
        paths.len()
    );
    Ok(ids)
}

/// Fetch and extract every identifier.
///
/// Up to `concurrency` fetches run at once; results keep the order of `ids`.
/// A failure only affects its own entry.
pub async fn scrape_ids(
    fetcher: &dyn PayloadFetcher,
    extractor: &PayloadExtractor,
    ids: &[Identifier],
    concurrency: usize,
) -> Vec<ScrapedEntry> {
    stream::iter(ids.iter().copied())
        .map(|id| async move { (id, fetcher.fetch(id).await) })
        .buffered(concurrency.max(1))
        .map(|(id, fetched)| {
            let entry = match fetched {
                Ok(page) => extractor.extract_entry(&page),
                Err(e) => {
                    log::warn!("{e}");
                    RecordEntry::FetchFailed {
                        detail: fetch_detail(e),
                    }
                }
            };
            log_entry(id, &entry);
            if let Err(e) = extractor.check(&entry) {
                log::warn!("ID {id}: rejected: {e}");
            }
            ScrapedEntry { id, entry }
        })
        .collect::<Vec<_>>()
        .await
}

/// Run the scrape stage and write the batch record store.
pub async fn run_scrape(
    config: &Config,
    storage: &LocalStorage,
    fetcher: &dyn PayloadFetcher,
) -> Result<ScrapeOutcome> {
    console::header("Scraping channel data");
    let mut stats = StageStats::start();

    let ids = run_collect(config, storage).await?;
    if ids.is_empty() {
        log::warn!("No identifiers found in listing files");
    }

    let extractor = PayloadExtractor::new(config.extract.strict)?;
    let entries = scrape_ids(fetcher, &extractor, &ids, config.fetch.max_concurrent).await;

    stats.processed = entries.len();
    stats.succeeded = entries
        .iter()
        .filter(|e| e.entry.complete_record().is_some())
        .count();
    stats.failed = stats.processed - stats.succeeded;

    let text = format::serialize(&entries, Layout::Batch);
    storage.write_text(&config.paths.keys_file, &text).await?;
    log::info!(
        "Record store written to {}",
        storage.path(&config.paths.keys_file).display()
    );

    let stats = stats.finish();
    console::summary("Scrape", &stats.summary_items());
    Ok(ScrapeOutcome { entries, stats })
}

/// The underlying message of a fetch error.
pub(crate) fn fetch_detail(error: AppError) -> String {
    match error {
        AppError::Fetch { message, .. } => message,
        other => other.to_string(),
    }
}

fn log_entry(id: Identifier, entry: &RecordEntry) {
    match entry {
        RecordEntry::FetchFailed { .. } => {}
        RecordEntry::BlobNotFound { .. } => {
            log::warn!("ID {id}: 292-character base64 string not found")
        }
        RecordEntry::DecodeFailed { detail, .. } => {
            log::warn!("ID {id}: error decoding the main base64 string: {detail}")
        }
        RecordEntry::Extracted(record) => {
            let missing = record.missing_fields();
            if missing.is_empty() {
                log::info!(
                    "ID {id}: extracted {}",
                    record.channel_key.as_deref().unwrap_or_default()
                );
            } else {
                log::warn!("ID {id}: not found: {}", missing.join(", "));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RecordParser;
    use crate::test_support::{FULL_FIELDS, FakeFetcher, blob_for, page_for};
    use tempfile::TempDir;

    fn fetcher() -> FakeFetcher {
        FakeFetcher::default()
            .with_page(123, page_for(Some("premium123"), &blob_for(FULL_FIELDS)))
            .with_page(
                7,
                page_for(Some("premium7"), &blob_for(&[("b_ts", "Nw=="), ("b_rnd", "cg==")])),
            )
            .with_page(9, "<html>maintenance</html>".to_string())
    }

    #[tokio::test]
    async fn test_scrape_ids_isolates_failures_and_keeps_order() {
        let extractor = PayloadExtractor::new(false).unwrap();
        let entries = scrape_ids(&fetcher(), &extractor, &[5, 7, 9, 123], 3).await;

        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 7, 9, 123]);
        assert!(matches!(entries[0].entry, RecordEntry::FetchFailed { .. }));
        assert!(matches!(entries[1].entry, RecordEntry::Extracted(_)));
        assert!(entries[1].entry.complete_record().is_none());
        assert!(matches!(entries[2].entry, RecordEntry::BlobNotFound { .. }));
        assert!(entries[3].entry.complete_record().is_some());
    }

    #[tokio::test]
    async fn test_run_scrape_writes_record_store() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("nfs.dat"), "premium123/ premium7/ premium123/").unwrap();
        std::fs::write(tmp.path().join("wind.dat"), "premium9/mono.m3u8").unwrap();

        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();
        let outcome = run_scrape(&config, &storage, &fetcher()).await.unwrap();

        assert_eq!(outcome.stats.processed, 3);
        assert_eq!(outcome.stats.succeeded, 1);
        assert_eq!(outcome.stats.failed, 2);

        let text = std::fs::read_to_string(tmp.path().join("keys.dat")).unwrap();
        assert!(text.starts_with("\nProcessing ID: 7\n"));
        assert!(text.contains("b_sig: Not found"));
        assert!(text.contains("Error: 292-character base64 string not found."));

        let stored = RecordParser::new().unwrap().parse(&text);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].channel_key, "premium123");
    }

    #[tokio::test]
    async fn test_run_scrape_without_listings_writes_empty_store() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let outcome = run_scrape(&Config::default(), &storage, &FakeFetcher::default())
            .await
            .unwrap();

        assert!(outcome.entries.is_empty());
        assert_eq!(std::fs::read_to_string(tmp.path().join("keys.dat")).unwrap(), "");
    }
}
