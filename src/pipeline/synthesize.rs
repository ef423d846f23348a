// src/pipeline/synthesize.rs

//! Synthesis stage: record store → signed URL file.

use crate::error::Result;
use crate::models::{Config, SignedUrl, StageStats};
use crate::services::UrlSynthesizer;
use crate::storage::{LocalStorage, RecordParser};
use crate::utils::console;

/// Read `keys_file`, compose a URL per complete record and write `urls_file`.
///
/// The URL file is only written when at least one URL was generated.
pub async fn run_synthesize(
    config: &Config,
    storage: &LocalStorage,
    keys_file: &str,
    urls_file: &str,
) -> Result<Vec<SignedUrl>> {
    console::header("Generating auth URLs");
    let mut stats = StageStats::start();

    let text = storage.read_text(keys_file).await?;
    let records = RecordParser::new()?.parse(&text);
    log::info!("Found {} complete records in {}", records.len(), keys_file);

    let urls = UrlSynthesizer::new(&config.auth.endpoint).synthesize_all(&records);
    stats.processed = records.len();
    stats.succeeded = urls.len();
    stats.failed = records.len() - urls.len();

    if urls.is_empty() {
        log::warn!(
            "No auth URLs generated. Please check the content and format of '{}'",
            keys_file
        );
    } else {
        storage.write_lines(urls_file, &urls).await?;
        log::info!("Successfully generated {} auth URLs", urls.len());
    }

    let stats = stats.finish();
    console::summary("Synthesize", &stats.summary_items());
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEYS: &str = "
Processing ID: 123
==================================================
CHANNEL_KEY: premium123
b_ts: MTIz
b_rnd: YWJj
b_sig: eHl6

Processing ID: 124
==================================================
CHANNEL_KEY: premium124
b_ts: MTIz
b_rnd: Not found
b_sig: eHl6

Processing ID: 125
==================================================
CHANNEL_KEY: premium125
b_ts: YQ
b_rnd: YWJj
b_sig: eHl6

Processing ID: 126
==================================================
CHANNEL_KEY: premium126
b_ts: MTIz
b_rnd: YWJj
b_sig: Not found
";

    #[tokio::test]
    async fn test_run_synthesize_writes_url_file() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.write_text("keys.dat", KEYS).await.unwrap();

        let urls = run_synthesize(&Config::default(), &storage, "keys.dat", "urls.dat")
            .await
            .unwrap();

        assert_eq!(urls.len(), 1);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("urls.dat")).unwrap(),
            "https://top2new.newkso.ru/auth.php?channel_id=premium123&ts=123&rnd=abc&sig=xyz\n"
        );
    }

    #[test]
    fn test_placeholder_blocks_never_reach_the_synthesizer() {
        let keys: Vec<String> = RecordParser::new()
            .unwrap()
            .parse(KEYS)
            .into_iter()
            .map(|record| record.channel_key)
            .collect();
        assert_eq!(keys, vec!["premium123", "premium125"]);
    }

    #[tokio::test]
    async fn test_run_synthesize_without_urls_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage
            .write_text("keys.dat", "CHANNEL_KEY: Not found\n")
            .await
            .unwrap();

        let urls = run_synthesize(&Config::default(), &storage, "keys.dat", "urls.dat")
            .await
            .unwrap();

        assert!(urls.is_empty());
        assert!(!tmp.path().join("urls.dat").exists());
    }

    #[tokio::test]
    async fn test_run_synthesize_missing_store_is_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(
            run_synthesize(&Config::default(), &storage, "keys.dat", "urls.dat")
                .await
                .is_err()
        );
    }
}
