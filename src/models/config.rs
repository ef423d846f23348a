//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Identifier;
use crate::utils;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Payload page fetching
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Payload extraction rules
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Signed URL composition
    #[serde(default)]
    pub auth: AuthConfig,

    /// Header probe invocation and classification
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Input and output file names
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if !self.fetch.endpoint_template.contains("{id}") {
            return Err(AppError::validation(
                "fetch.endpoint_template must contain an {id} placeholder",
            ));
        }
        Url::parse(&self.fetch.url_for(0))?;
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        Url::parse(&self.auth.endpoint)?;
        if self.probe.program.trim().is_empty() {
            return Err(AppError::validation("probe.program is empty"));
        }
        if self.probe.user_agent.trim().is_empty() {
            return Err(AppError::validation("probe.user_agent is empty"));
        }
        if self.probe_host().is_none() {
            return Err(AppError::validation(
                "probe.host is unset and auth.endpoint has no host",
            ));
        }
        if self.paths.keys_file.trim().is_empty() || self.paths.urls_file.trim().is_empty() {
            return Err(AppError::validation(
                "paths.keys_file and paths.urls_file are required",
            ));
        }
        Ok(())
    }

    /// Host header for probes: explicit override, else the auth endpoint's host.
    pub fn probe_host(&self) -> Option<String> {
        self.probe
            .host
            .clone()
            .or_else(|| utils::get_domain(&self.auth.endpoint))
    }
}

/// Payload page request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Page URL with an `{id}` placeholder
    #[serde(default = "defaults::endpoint_template")]
    pub endpoint_template: String,

    /// Browser-like User-Agent header
    #[serde(default = "defaults::fetch_user_agent")]
    pub user_agent: String,

    /// Referer header
    #[serde(default = "defaults::fetch_referer")]
    pub referer: String,

    /// Request timeout in seconds, 0 disables it
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl FetchConfig {
    /// Page URL for one identifier.
    pub fn url_for(&self, id: Identifier) -> String {
        self.endpoint_template.replace("{id}", &id.to_string())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint_template: defaults::endpoint_template(),
            user_agent: defaults::fetch_user_agent(),
            referer: defaults::fetch_referer(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Reject records with any missing field instead of storing placeholders
    #[serde(default)]
    pub strict: bool,
}

/// Signed URL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "defaults::auth_endpoint")]
    pub endpoint: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::auth_endpoint(),
        }
    }
}

/// Header probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Program invoked for each URL
    #[serde(default = "defaults::probe_program")]
    pub program: String,

    /// Device-identifying User-Agent header
    #[serde(default = "defaults::probe_user_agent")]
    pub user_agent: String,

    /// Host header override (defaults to the auth endpoint host)
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "defaults::probe_origin")]
    pub origin: String,

    #[serde(default = "defaults::probe_referer")]
    pub referer: String,

    /// Skip TLS verification (`-k`)
    #[serde(default = "defaults::insecure")]
    pub insecure: bool,

    /// Per-probe time limit in seconds (`--max-time`), 0 disables it
    #[serde(default)]
    pub max_time_secs: u64,

    /// Status lines flagged as forbidden in batch mode
    #[serde(default = "defaults::forbidden_status_lines")]
    pub forbidden_status_lines: Vec<String>,

    /// Treat every non-2xx status line as forbidden
    #[serde(default)]
    pub non_success_is_forbidden: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: defaults::probe_program(),
            user_agent: defaults::probe_user_agent(),
            host: None,
            origin: defaults::probe_origin(),
            referer: defaults::probe_referer(),
            insecure: defaults::insecure(),
            max_time_secs: 0,
            forbidden_status_lines: defaults::forbidden_status_lines(),
            non_success_is_forbidden: false,
        }
    }
}

/// File locations, relative to the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Listing caches scanned for identifiers
    #[serde(default = "defaults::listing_files")]
    pub listing_files: Vec<String>,

    #[serde(default = "defaults::keys_file")]
    pub keys_file: String,

    #[serde(default = "defaults::urls_file")]
    pub urls_file: String,

    #[serde(default = "defaults::manual_keys_file")]
    pub manual_keys_file: String,

    #[serde(default = "defaults::manual_urls_file")]
    pub manual_urls_file: String,

    /// Optional JSON report of probe results
    #[serde(default)]
    pub probe_report: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            listing_files: defaults::listing_files(),
            keys_file: defaults::keys_file(),
            urls_file: defaults::urls_file(),
            manual_keys_file: defaults::manual_keys_file(),
            manual_urls_file: defaults::manual_urls_file(),
            probe_report: None,
        }
    }
}

mod defaults {
    // Fetch defaults
    pub fn endpoint_template() -> String {
        "https://jxoxkplay.xyz/premiumtv/daddylivehd.php?id={id}".into()
    }
    pub fn fetch_user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36".into()
    }
    pub fn fetch_referer() -> String {
        "https://daddylivestream.com".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Auth defaults
    pub fn auth_endpoint() -> String {
        "https://top2new.newkso.ru/auth.php".into()
    }

    // Probe defaults
    pub fn probe_program() -> String {
        "curl".into()
    }
    pub fn probe_user_agent() -> String {
        "TiviMate/5.2.0 (Android 12)".into()
    }
    pub fn probe_origin() -> String {
        "https://jxoxkplay.xyz".into()
    }
    pub fn probe_referer() -> String {
        "https://jxoxkplay.xyz/".into()
    }
    pub fn insecure() -> bool {
        true
    }
    pub fn forbidden_status_lines() -> Vec<String> {
        vec!["HTTP/2 403".into()]
    }

    // Path defaults
    pub fn listing_files() -> Vec<String> {
        ["ddy6.dat", "nfs.dat", "wind.dat", "zeko.dat", "dokko1.dat"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn keys_file() -> String {
        "keys.dat".into()
    }
    pub fn urls_file() -> String {
        "urls.dat".into()
    }
    pub fn manual_keys_file() -> String {
        "manual_key.dat".into()
    }
    pub fn manual_urls_file() -> String {
        "manual_url.dat".into()
    }
}
