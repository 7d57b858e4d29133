//! Data models for news articles, bookmarks and exported editions.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Article`]: One crawled article as published in a shard document
//! - [`Bookmark`]: A saved article in the persisted bookmark list
//! - [`Edition`]: An aggregated snapshot written by the JSON export
//!
//! Crawler output is loose (fields go missing, extra fields appear), so every
//! [`Article`] field deserializes leniently.

use crate::slots::TimeSlot;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Categories published by the crawler, in navigation order.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "politics",
    "sports",
    "economy",
    "society",
    "international",
    "culture",
];

/// Newspapers crawled for every category, in navigation order.
pub const DEFAULT_SOURCES: [&str; 3] = ["donga", "chosun", "joongang"];

/// A news article as found in a shard document.
///
/// `category`, `source` and `slot` are overwritten by the aggregator with the
/// tags of the shard the article was read from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Article {
    /// The headline.
    #[serde(default)]
    pub title: String,
    /// Canonical article URL; the identity key when non-empty.
    #[serde(default)]
    pub url: String,
    /// Publication day in `YYYY-MM-DD` form.
    #[serde(default)]
    pub date: String,
    /// Category id, e.g. `"politics"`.
    #[serde(default)]
    pub category: String,
    /// Source id, e.g. `"donga"`.
    #[serde(default)]
    pub source: String,
    /// Lead image, if the crawler found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Crawl timestamp in ISO form. Kept as text because the crawler does not
    /// always attach an offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
    /// The time-slot shard this article was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeSlot>,
}

impl Article {
    /// The value used to decide uniqueness: the URL, or `title + date` when
    /// the URL is empty.
    pub fn identity_key(&self) -> String {
        if self.url.is_empty() {
            format!("{}{}", self.title, self.date)
        } else {
            self.url.clone()
        }
    }

    /// Stable bookmark id for this article. See [`identity_hash`].
    pub fn bookmark_id(&self) -> String {
        identity_hash(&self.identity_key())
    }
}

/// FNV-1a 64-bit hash of `key`, as 16 lowercase hex digits.
///
/// Offset basis `0xcbf29ce484222325`, prime `0x100000001b3`, over the UTF-8
/// bytes of the key. Not cryptographic.
pub fn identity_hash(key: &str) -> String {
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    let hash = key.bytes().fold(FNV_OFFSET_BASIS, |acc, byte| {
        (acc ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    format!("{hash:016x}")
}

/// A saved article.
///
/// Serialized with `bookmarkedAt` to stay readable by the web portal, which
/// shares the same stored list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// [`identity_hash`] of the article identity key.
    pub id: String,
    pub title: String,
    pub url: String,
    /// Lead image URL, empty when the article had none.
    #[serde(default)]
    pub image: String,
    pub category: String,
    pub source: String,
    pub date: String,
    pub bookmarked_at: DateTime<Utc>,
}

impl Bookmark {
    /// Build a bookmark record for `article` saved at `bookmarked_at`.
    pub fn from_article(article: &Article, bookmarked_at: DateTime<Utc>) -> Self {
        Self {
            id: article.bookmark_id(),
            title: article.title.clone(),
            url: article.url.clone(),
            image: article.image_url.clone().unwrap_or_default(),
            category: article.category.clone(),
            source: article.source.clone(),
            date: article.date.clone(),
            bookmarked_at,
        }
    }
}

/// Aggregated articles for one category and source on one day.
///
/// Written by [`crate::outputs::json::write_edition`].
#[derive(Debug, Deserialize, Serialize)]
pub struct Edition {
    pub date: NaiveDate,
    pub category: String,
    pub source: String,
    /// Slots that were queried to build this edition.
    pub slots: Vec<TimeSlot>,
    pub generated_at: DateTime<Utc>,
    pub articles: Vec<Article>,
}

/// Display label for a category id. Unknown ids label as themselves.
pub fn category_label(category: &str) -> &str {
    match category {
        "politics" => "정치",
        "sports" => "스포츠",
        "economy" => "경제",
        "society" => "사회",
        "international" => "국제",
        "culture" => "문화",
        other => other,
    }
}

/// Display label for a source id. Unknown ids label as themselves.
pub fn source_label(source: &str) -> &str {
    match source {
        "donga" => "동아일보",
        "chosun" => "조선일보",
        "joongang" => "중앙일보",
        other => other,
    }
}

/// Placeholder image for articles without `image_url`.
pub fn default_image(category: &str) -> &'static str {
    match category {
        "politics" => "static/images/politics-default.jpg",
        "sports" => "static/images/sports-default.jpg",
        "economy" => "static/images/economy-default.jpg",
        _ => "static/images/no-image.png",
    }
}
