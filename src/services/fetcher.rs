// src/services/fetcher.rs

//! Payload page fetching.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::REFERER;

use crate::error::{AppError, Result};
use crate::models::{FetchConfig, Identifier};
use crate::utils::http;

/// Source of raw payload pages.
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    /// Fetch the page body for one identifier.
    ///
    /// Transport failures and non-2xx statuses become [`AppError::Fetch`].
    async fn fetch(&self, id: Identifier) -> Result<String>;
}

/// Fetches payload pages over HTTP with browser-like headers.
pub struct HttpFetcher {
    config: FetchConfig,
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = http::create_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl PayloadFetcher for HttpFetcher {
    async fn fetch(&self, id: Identifier) -> Result<String> {
        let url = self.config.url_for(id);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .header(REFERER, &self.config.referer)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(id, e))?;

        response.text().await.map_err(|e| AppError::fetch(id, e))
    }
}
