//! Fetch, tag, concatenate and deduplicate news shards.
//!
//! Every query follows the same pipeline:
//!
//! 1. Work out which time-slots can exist for the date ([`available_slots`]).
//! 2. Fetch one shard per (category, source, slot). Missing, failing or
//!    malformed shards contribute nothing; partial data is normal because
//!    later slots may not have been crawled yet.
//! 3. Tag each article with the category, source and slot it came from.
//! 4. Concatenate in a fixed order (category, then source, then slot).
//! 5. Drop later duplicates by identity key, so the earliest capture of an
//!    article re-published across slots is the one kept.
//!
//! Fetches fan out concurrently but results are always reassembled in input
//! order, so output never depends on network timing.

use crate::models::Article;
use crate::slots::{TimeSlot, available_slots};
use crate::source::{FetchError, ShardKey, ShardSource};
use crate::utils::{looks_truncated, truncate_for_log};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

/// Longest history [`NewsAggregator::available_dates`] will probe.
pub const MAX_LOOKBACK_DAYS: u32 = 366;

/// Tunables for [`NewsAggregator`].
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Category ids iterated by the cross-category queries.
    pub categories: Vec<String>,
    /// Source ids iterated for every category.
    pub sources: Vec<String>,
    /// Upper bound on (category, source) pairs fetched at once.
    pub max_concurrent_fetches: usize,
    /// Read the un-slotted `news_{date}.json` when no slot shard could be read.
    pub legacy_fallback: bool,
    /// Banner: articles taken from the head of each source.
    pub banner_per_source: usize,
    /// Banner: total slides.
    pub banner_limit: usize,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            categories: crate::models::DEFAULT_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            sources: crate::models::DEFAULT_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_concurrent_fetches: 8,
            legacy_fallback: true,
            banner_per_source: 2,
            banner_limit: 4,
        }
    }
}

/// Why an aggregated result came back empty.
///
/// Decided from dates alone, never from fetch outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Today (or later): the crawl has not published yet.
    NotYetPublished,
    /// A past date with nothing published.
    NeverPublished,
}

/// Classify an empty result for `date` as seen on `today`.
pub fn empty_state(date: NaiveDate, today: NaiveDate) -> EmptyState {
    if date >= today {
        EmptyState::NotYetPublished
    } else {
        EmptyState::NeverPublished
    }
}

/// Keep the first article for each identity key, preserving order.
///
/// Idempotent: deduplicating an already deduplicated list returns it unchanged.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    articles.into_iter().unique_by(Article::identity_key).collect()
}

/// The `limit` most recently crawled articles, by `scraped_at` descending.
/// Articles without a timestamp go last and otherwise keep their order.
pub fn newest_first(mut articles: Vec<Article>, limit: usize) -> Vec<Article> {
    articles.sort_by(|a, b| b.scraped_at.cmp(&a.scraped_at));
    articles.truncate(limit);
    articles
}

/// Aggregates shards from a [`ShardSource`].
#[derive(Debug)]
pub struct NewsAggregator<S> {
    source: S,
    options: AggregatorOptions,
}

impl<S: ShardSource> NewsAggregator<S> {
    pub fn new(source: S, options: AggregatorOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Articles for one category and source on `date`.
    ///
    /// Ordered by slot, then by position within the shard; deduplicated.
    #[instrument(level = "info", skip(self, now))]
    pub async fn aggregate(
        &self,
        category: &str,
        source: &str,
        date: NaiveDate,
        now: &DateTime<FixedOffset>,
    ) -> Vec<Article> {
        let slots = available_slots(date, now);
        let articles = dedupe(self.fetch_pair(category, source, date, &slots).await);
        info!(count = articles.len(), slots = slots.len(), "Aggregated articles");
        articles
    }

    /// Articles for every configured category and source on `date`.
    ///
    /// Ordered by category, source, then slot; deduplicated across the whole
    /// set.
    #[instrument(level = "info", skip(self, now))]
    pub async fn aggregate_all(&self, date: NaiveDate, now: &DateTime<FixedOffset>) -> Vec<Article> {
        let slots = available_slots(date, now);
        let slots = &slots;
        let pairs: Vec<(&String, &String)> = self
            .options
            .categories
            .iter()
            .cartesian_product(self.options.sources.iter())
            .collect();
        let pair_count = pairs.len();

        let per_pair: Vec<Vec<Article>> = stream::iter(pairs)
            .map(|(category, source)| async move {
                self.fetch_pair(category, source, date, slots).await
            })
            .buffered(self.options.max_concurrent_fetches.max(1))
            .collect()
            .await;

        let fetched: usize = per_pair.iter().map(Vec::len).sum();
        let articles = dedupe(per_pair.into_iter().flatten().collect());
        info!(
            pairs = pair_count,
            fetched,
            unique = articles.len(),
            "Aggregated articles across all categories"
        );
        articles
    }

    /// Banner slides for `category`: the head of today's aggregate for each
    /// source, interleaved in source order.
    #[instrument(level = "info", skip(self, now))]
    pub async fn latest(&self, category: &str, now: &DateTime<FixedOffset>) -> Vec<Article> {
        let today = now.date_naive();
        let per_source = join_all(
            self.options
                .sources
                .iter()
                .map(|source| self.aggregate(category, source, today, now)),
        )
        .await;

        let mut slides = dedupe(
            per_source
                .into_iter()
                .flat_map(|articles| articles.into_iter().take(self.options.banner_per_source))
                .collect(),
        );
        slides.truncate(self.options.banner_limit);
        slides
    }

    /// Most recently crawled articles across every category and source today.
    ///
    /// Sorted by `scraped_at` descending; articles without a timestamp go last
    /// and otherwise keep aggregation order.
    #[instrument(level = "info", skip(self, now))]
    pub async fn ticker(&self, now: &DateTime<FixedOffset>, limit: usize) -> Vec<Article> {
        newest_first(self.aggregate_all(now.date_naive(), now).await, limit)
    }

    /// Dates within the last `days` days (today included, newest first) that
    /// have at least one article for `category` and `source`. `days` is
    /// capped at [`MAX_LOOKBACK_DAYS`].
    #[instrument(level = "info", skip(self, now))]
    pub async fn available_dates(
        &self,
        category: &str,
        source: &str,
        days: u32,
        now: &DateTime<FixedOffset>,
    ) -> Vec<NaiveDate> {
        let today = now.date_naive();
        let days = days.min(MAX_LOOKBACK_DAYS);
        let candidates = (0..i64::from(days))
            .map_while(|offset| today.checked_sub_signed(Duration::days(offset)));

        let probes: Vec<(NaiveDate, bool)> = stream::iter(candidates)
            .map(|date| async move {
                let found = !self.aggregate(category, source, date, now).await.is_empty();
                (date, found)
            })
            .buffered(self.options.max_concurrent_fetches.max(1))
            .collect()
            .await;

        probes
            .into_iter()
            .filter_map(|(date, found)| found.then_some(date))
            .collect()
    }

    /// Fetch and parse one trend-style or shard document at `path`.
    pub(crate) async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, FetchError> {
        let body = self.source.fetch(path).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(
                %path,
                truncated = looks_truncated(&e),
                preview = %truncate_for_log(&body, 200),
                error = %e,
                "Malformed JSON document"
            );
            FetchError::Malformed(e)
        })
    }

    /// Concatenated (not deduplicated) articles of one pair for `slots`.
    async fn fetch_pair(
        &self,
        category: &str,
        source: &str,
        date: NaiveDate,
        slots: &[TimeSlot],
    ) -> Vec<Article> {
        if slots.is_empty() {
            debug!(%category, %source, %date, "No slots available; nothing to fetch");
            return Vec::new();
        }

        let keys: Vec<ShardKey> = slots
            .iter()
            .map(|slot| ShardKey::new(category, source, date, Some(*slot)))
            .collect();
        let results = join_all(keys.iter().map(|key| self.fetch_shard(key))).await;

        let mut articles = Vec::new();
        let mut any_read = false;
        for (key, result) in keys.iter().zip(results) {
            match result {
                Ok(mut shard) => {
                    any_read = true;
                    articles.append(&mut shard);
                }
                Err(e) => log_shard_failure(key, &e),
            }
        }

        if !any_read && self.options.legacy_fallback {
            let legacy = ShardKey::new(category, source, date, None);
            match self.fetch_shard(&legacy).await {
                Ok(shard) => {
                    info!(path = %legacy.path(), count = shard.len(), "Using legacy shard");
                    articles = shard;
                }
                Err(e) => log_shard_failure(&legacy, &e),
            }
        }

        articles
    }

    /// One shard, tagged with its key.
    async fn fetch_shard(&self, key: &ShardKey) -> Result<Vec<Article>, FetchError> {
        let mut articles: Vec<Article> = self.fetch_json(&key.path()).await?;
        for article in &mut articles {
            article.category = key.category.clone();
            article.source = key.source.clone();
            article.slot = key.slot;
        }
        debug!(path = %key.path(), count = articles.len(), "Read shard");
        Ok(articles)
    }
}

fn log_shard_failure(key: &ShardKey, error: &FetchError) {
    if error.is_not_found() {
        debug!(path = %key.path(), "Shard not published; treating as empty");
    } else {
        warn!(path = %key.path(), error = %error, "Shard fetch failed; treating as empty");
    }
}
