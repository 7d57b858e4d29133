//! Configuration file parser for the portal's YAML settings.
//!
//! The file is optional: a missing or empty file yields `Config::default()`.
//! Every key is optional and unknown keys are ignored. Command-line flags are
//! applied on top by the binary.

use crate::aggregator::AggregatorOptions;
use crate::bookmarks::DEFAULT_BOOKMARK_LIMIT;
use crate::models::{DEFAULT_CATEGORIES, DEFAULT_SOURCES};
use crate::source::{DataSource, DirSource, FetchError, HttpSource};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML in config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("UTC offset out of range: {0} hours")]
    InvalidOffset(i32),
}

/// Portal configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the published data tree. Takes precedence over `data_dir`.
    pub data_url: Option<String>,
    /// Local checkout of the data tree.
    pub data_dir: PathBuf,
    /// JSON file holding bookmarks and the theme.
    pub state_file: PathBuf,
    pub categories: Vec<String>,
    pub sources: Vec<String>,
    /// Offset of the portal's clock from UTC; publish times are in this zone.
    pub utc_offset_hours: i32,
    pub request_timeout_secs: u64,
    pub max_concurrent_fetches: usize,
    pub legacy_fallback: bool,
    pub bookmark_limit: usize,
    pub banner_per_source: usize,
    pub banner_limit: usize,
    pub ticker_limit: usize,
    /// Render without an authenticated session.
    pub auth_bypass: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: None,
            data_dir: PathBuf::from("data"),
            state_file: PathBuf::from("news_portal_state.json"),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            utc_offset_hours: 9,
            request_timeout_secs: 10,
            max_concurrent_fetches: 8,
            legacy_fallback: true,
            bookmark_limit: DEFAULT_BOOKMARK_LIMIT,
            banner_per_source: 2,
            banner_limit: 4,
            ticker_limit: 10,
            auth_bypass: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid YAML → `Err(ConfigError::Parse)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content)?;
        config.offset()?;
        info!(
            path = %path.display(),
            categories = config.categories.len(),
            sources = config.sources.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// The portal's fixed offset from UTC.
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_hours))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            categories: self.categories.clone(),
            sources: self.sources.clone(),
            max_concurrent_fetches: self.max_concurrent_fetches,
            legacy_fallback: self.legacy_fallback,
            banner_per_source: self.banner_per_source,
            banner_limit: self.banner_limit,
        }
    }

    /// The HTTP source when `data_url` is set, the directory source otherwise.
    pub fn data_source(&self) -> Result<DataSource, FetchError> {
        match &self.data_url {
            Some(url) => {
                let client = reqwest::Client::builder()
                    .user_agent(concat!("news_portal/", env!("CARGO_PKG_VERSION")))
                    .build()?;
                let source = HttpSource::new(client, url, self.request_timeout())?;
                info!(%url, "Reading shards over HTTP");
                Ok(DataSource::Http(source))
            }
            None => {
                info!(dir = %self.data_dir.display(), "Reading shards from directory");
                Ok(DataSource::Dir(DirSource::new(&self.data_dir)))
            }
        }
    }
}
