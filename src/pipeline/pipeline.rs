// src/pipeline/pipeline.rs

use crate::error::Result;
use crate::models::Config;
use crate::services::{PayloadFetcher, Prober, StatusClassifier};
use crate::storage::LocalStorage;
use crate::utils::console;

use super::probe::run_probe;
use super::scrape::run_scrape;
use super::synthesize::run_synthesize;

/// Run every batch stage.
///
/// Scrape and synthesis failures are logged and the run moves on. Only a
/// missing probe tool fails the whole run.
pub async fn run_pipeline(
    config: &Config,
    storage: &LocalStorage,
    fetcher: &dyn PayloadFetcher,
    prober: &dyn Prober,
) -> Result<()> {
    console::header("Starting batch pipeline");
    let total_steps = 3;

    console::step(1, total_steps, "Scrape - Fetching and decoding channel data");
    if let Err(e) = run_scrape(config, storage, fetcher).await {
        log::error!("Scrape failed: {e}");
    }

    console::step(2, total_steps, "Synthesize - Generating auth URLs");
    let urls = match run_synthesize(
        config,
        storage,
        &config.paths.keys_file,
        &config.paths.urls_file,
    )
    .await
    {
        Ok(urls) => urls,
        Err(e) => {
            log::error!("URL generation failed: {e}");
            Vec::new()
        }
    };

    console::step(3, total_steps, "Probe - Checking auth URLs");
    if urls.is_empty() {
        log::warn!("No auth URLs to probe");
    } else {
        run_probe(
            config,
            storage,
            &config.paths.urls_file,
            prober,
            StatusClassifier::from_config(&config.probe),
        )
        .await?;
    }

    log::info!("Batch pipeline completed");
    Ok(())
}
