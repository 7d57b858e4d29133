//! Where shard documents come from.
//!
//! The crawler publishes a static tree of JSON documents:
//!
//! ```text
//! data_root/
//! ├── politics/
//! │   └── donga/
//! │       ├── news_2025-12-16_09-20.json   # morning shard
//! │       ├── news_2025-12-16_15-00.json   # afternoon shard
//! │       └── news_2025-12-08.json         # legacy shard (no slot)
//! └── trends/
//!     └── trends_2025-12-16.json
//! ```
//!
//! The tree is served either over HTTP ([`HttpSource`]) or read from a local
//! checkout ([`DirSource`]). Both implement [`ShardSource`], which hands back
//! the raw document text; parsing happens in the aggregator so both sources
//! fail the same way on malformed payloads.

use crate::slots::TimeSlot;
use chrono::NaiveDate;
use itertools::Itertools;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Errors from fetching or decoding one document.
///
/// The aggregator treats every variant as "no data for this shard".
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, body read).
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with a non-success status other than 404.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// The document does not exist (yet).
    #[error("Document not found: {0}")]
    NotFound(String),
    /// The request exceeded the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Local read failure other than a missing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not the JSON shape we expect.
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The document path could not be joined onto the base URL.
    #[error("Invalid document URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// Missing documents are expected (later slots not crawled yet) and are
    /// logged quieter than real failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Address of one shard document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardKey {
    pub category: String,
    pub source: String,
    pub date: NaiveDate,
    /// `None` addresses the legacy, un-slotted document for the day.
    pub slot: Option<TimeSlot>,
}

impl ShardKey {
    pub fn new(category: &str, source: &str, date: NaiveDate, slot: Option<TimeSlot>) -> Self {
        Self {
            category: category.to_string(),
            source: source.to_string(),
            date,
            slot,
        }
    }

    /// Path relative to the data root.
    pub fn path(&self) -> String {
        match self.slot {
            Some(slot) => format!(
                "{}/{}/news_{}_{}.json",
                self.category,
                self.source,
                self.date.format("%Y-%m-%d"),
                slot.file_stamp()
            ),
            None => format!(
                "{}/{}/news_{}.json",
                self.category,
                self.source,
                self.date.format("%Y-%m-%d")
            ),
        }
    }
}

/// Path of the trend document for `date`, relative to the data root.
pub fn trend_path(date: NaiveDate) -> String {
    format!("trends/trends_{}.json", date.format("%Y-%m-%d"))
}

/// A read-only provider of documents under a data root.
pub trait ShardSource {
    /// Fetch the document at `path` (relative to the data root) as text.
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Documents served over HTTP(S), e.g. a GitHub Pages `data/` directory.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpSource {
    /// Create a source rooted at `base`. A trailing `/` is added when missing
    /// so relative paths join underneath it.
    pub fn new(client: reqwest::Client, base: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    /// Resolve `path` under the base URL, percent-encoding each segment.
    pub fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        let encoded = path.split('/').map(urlencoding::encode).join("/");
        Ok(self.base.join(&encoded)?)
    }
}

impl ShardSource for HttpSource {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path)?;

        let response = tokio::time::timeout(self.timeout, self.client.get(url.clone()).send())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = tokio::time::timeout(self.timeout, response.text())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;
        debug!(%url, bytes = body.len(), "Fetched document");
        Ok(body)
    }
}

/// Documents read from a local directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShardSource for DirSource {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(body) => {
                debug!(path = %full.display(), bytes = body.len(), "Read document");
                Ok(body)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(full.display().to_string()))
            }
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}

/// The configured data source, chosen at startup.
#[derive(Debug, Clone)]
pub enum DataSource {
    Http(HttpSource),
    Dir(DirSource),
}

impl ShardSource for DataSource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        match self {
            DataSource::Http(source) => source.fetch(path).await,
            DataSource::Dir(source) => source.fetch(path).await,
        }
    }
}
