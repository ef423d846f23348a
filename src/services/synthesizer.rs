// src/services/synthesizer.rs

//! Signed URL synthesis from stored records.

use crate::error::Result;
use crate::models::{SignedUrl, StoredRecord};
use crate::utils::encoding;

/// Composes auth endpoint URLs from stored records.
pub struct UrlSynthesizer {
    endpoint: String,
}

impl UrlSynthesizer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Decode the three values of `record` and compose its URL.
    pub fn synthesize(&self, record: &StoredRecord) -> Result<SignedUrl> {
        let ts = encoding::decode_base64_utf8(&record.ts_b64, "b_ts")?;
        let rnd = encoding::decode_base64_utf8(&record.rnd_b64, "b_rnd")?;
        let sig = encoding::decode_base64_utf8(&record.sig_b64, "b_sig")?;

        Ok(SignedUrl::compose(
            &self.endpoint,
            &record.channel_key,
            &ts,
            &rnd,
            &sig,
        ))
    }

    /// URLs for every record that decodes, in input order.
    ///
    /// Records that fail to decode are logged and skipped.
    pub fn synthesize_all(&self, records: &[StoredRecord]) -> Vec<SignedUrl> {
        records
            .iter()
            .filter_map(|record| match self.synthesize(record) {
                Ok(url) => Some(url),
                Err(e) => {
                    log::warn!(
                        "Base64 decoding error for channel '{}': {}. Skipping this block.",
                        record.channel_key,
                        e
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://top2new.newkso.ru/auth.php";

    fn record(key: &str, ts: &str, rnd: &str, sig: &str) -> StoredRecord {
        StoredRecord {
            channel_key: key.to_string(),
            ts_b64: ts.to_string(),
            rnd_b64: rnd.to_string(),
            sig_b64: sig.to_string(),
        }
    }

    #[test]
    fn test_synthesize_composes_decoded_values() {
        let synthesizer = UrlSynthesizer::new(ENDPOINT);
        let url = synthesizer
            .synthesize(&record("premium123", "MTIz", "YWJj", "eHl6"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://top2new.newkso.ru/auth.php?channel_id=premium123&ts=123&rnd=abc&sig=xyz"
        );
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let synthesizer = UrlSynthesizer::new(ENDPOINT);
        let rec = record("premium7", "MTcwMDAwMDAwMA==", "cjRuZA==", "c2lnbmF0dXJl");
        assert_eq!(
            synthesizer.synthesize(&rec).unwrap(),
            synthesizer.synthesize(&rec).unwrap()
        );
    }

    #[test]
    fn test_synthesize_all_skips_undecodable_and_keeps_order() {
        let synthesizer = UrlSynthesizer::new(ENDPOINT);
        let records = vec![
            record("premium9", "OQ==", "YQ==", "Yg=="),
            // "YQ" lacks padding
            record("premium2", "YQ", "YWJj", "eHl6"),
            // decodes to 0xFF 0xFE 0xFD
            record("premium3", "MTIz", "//79", "eHl6"),
            record("premium1", "MQ==", "Yw==", "ZA=="),
        ];

        let urls: Vec<String> = synthesizer
            .synthesize_all(&records)
            .into_iter()
            .map(SignedUrl::into_string)
            .collect();

        assert_eq!(
            urls,
            vec![
                format!("{ENDPOINT}?channel_id=premium9&ts=9&rnd=a&sig=b"),
                format!("{ENDPOINT}?channel_id=premium1&ts=1&rnd=c&sig=d"),
            ]
        );
    }
}
