// src/pipeline/manual.rs

//! Single-identifier run for re-checking one channel.
//!
//! Unlike the batch pipeline every stage is strict: the first failure ends
//! the run with an error.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{AppError, Result};
use crate::models::{Config, Identifier, RecordEntry};
use crate::services::{PayloadExtractor, PayloadFetcher, ProbeReport, Prober, StatusClassifier};
use crate::storage::{Layout, LocalStorage, format};
use crate::utils::console;

use super::probe::run_probe;
use super::scrape::fetch_detail;
use super::synthesize::run_synthesize;

const PROMPT: &str = "Enter the ID of the channel giving a 403/418: ";

/// Parse an identifier typed by the user.
pub fn parse_identifier(input: &str) -> Result<Identifier> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::invalid_input("No ID entered"));
    }
    input
        .parse()
        .map_err(|_| AppError::invalid_input(format!("'{input}' is not a number")))
}

/// Ask for an identifier on stdin.
pub async fn prompt_identifier() -> Result<Identifier> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(PROMPT.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    parse_identifier(&line)
}

/// Fetch, decode, synthesize and probe a single identifier.
pub async fn run_manual(
    config: &Config,
    storage: &LocalStorage,
    fetcher: &dyn PayloadFetcher,
    prober: &dyn Prober,
    id: Identifier,
) -> Result<ProbeReport> {
    console::header(&format!("Manual run for ID {id}"));
    let keys_file = &config.paths.manual_keys_file;
    let urls_file = &config.paths.manual_urls_file;

    let extractor = PayloadExtractor::new(true)?;
    let fetched = fetcher.fetch(id).await;
    let (entry, failure) = match fetched {
        Ok(page) => {
            let entry = extractor.extract_entry(&page);
            let failure = extractor.check(&entry).err();
            (entry, failure)
        }
        Err(e) => {
            let detail = fetch_detail(e);
            let entry = RecordEntry::FetchFailed {
                detail: detail.clone(),
            };
            (entry, Some(AppError::fetch(id, detail)))
        }
    };

    let mut text = String::new();
    format::write_block(&mut text, id, &entry, Layout::Single);
    storage.write_text(keys_file, &text).await?;

    if let Some(e) = failure {
        log::error!("Failed to fetch or decode data: {e}");
        return Err(e);
    }
    log::info!("Channel data fetching completed");

    let urls = run_synthesize(config, storage, keys_file, urls_file).await?;
    if urls.is_empty() {
        return Err(AppError::decode(
            keys_file.as_str(),
            "no auth URLs could be generated",
        ));
    }

    run_probe(
        config,
        storage,
        urls_file,
        prober,
        StatusClassifier::permissive(),
    )
    .await
}
