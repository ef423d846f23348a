// src/services/collector.rs

//! Identifier collection from cached listing files.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::Identifier;

/// Scans listing documents for `premium<digits>/` references.
pub struct IdentifierCollector {
    pattern: Regex,
}

impl IdentifierCollector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"premium(\d+)/")?,
        })
    }

    /// Identifiers referenced by one document, in order of appearance.
    pub fn scan<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Identifier> + 'a {
        self.pattern.captures_iter(text).filter_map(|caps| {
            let digits = &caps[1];
            digits
                .parse::<Identifier>()
                .inspect_err(|e| log::warn!("Skipping identifier {digits}: {e}"))
                .ok()
        })
    }

    /// Sorted, distinct identifiers across in-memory documents.
    pub fn collect_from_texts<'a, I>(&self, documents: I) -> Vec<Identifier>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ids = BTreeSet::new();
        for text in documents {
            ids.extend(self.scan(text));
        }
        ids.into_iter().collect()
    }

    /// Sorted, distinct identifiers across listing files.
    ///
    /// Unreadable files are logged and skipped.
    pub async fn collect<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<Identifier> {
        let mut ids = BTreeSet::new();
        for path in paths {
            let path = path.as_ref();
            match tokio::fs::read_to_string(path).await {
                Ok(text) => {
                    let before = ids.len();
                    ids.extend(self.scan(&text));
                    log::debug!(
                        "{}: {} new identifiers",
                        path.display(),
                        ids.len() - before
                    );
                }
                Err(e) => {
                    log::error!("{}", AppError::file_access(path, e));
                }
            }
        }
        ids.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_sorts_and_dedups() {
        let collector = IdentifierCollector::new().unwrap();
        let ids = collector.collect_from_texts([
            "x premium12/index.m3u8 premium3/ noise premium12/",
            "premium100/mono.m3u8\npremium3/",
        ]);
        assert_eq!(ids, vec![3, 12, 100]);
    }

    #[test]
    fn test_requires_trailing_slash_and_digits() {
        let collector = IdentifierCollector::new().unwrap();
        let ids = collector.collect_from_texts(["premium7 premium/ premiumX/ premium8/"]);
        assert_eq!(ids, vec![8]);
    }

    #[test]
    fn test_leading_zeros_collapse() {
        let collector = IdentifierCollector::new().unwrap();
        let ids = collector.collect_from_texts(["premium007/ premium7/"]);
        assert_eq!(ids, vec![7]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let collector = IdentifierCollector::new().unwrap();
        assert!(collector.collect_from_texts(["nothing here"]).is_empty());
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("nfs.dat");
        std::fs::write(&present, "premium44/ premium2/").unwrap();
        let missing = tmp.path().join("ddy6.dat");

        let collector = IdentifierCollector::new().unwrap();
        let ids = collector.collect(&[missing, present]).await;
        assert_eq!(ids, vec![2, 44]);
    }
}
