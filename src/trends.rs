//! Daily keyword trends.
//!
//! The crawler publishes `trends/trends_{date}.json` with the most frequent
//! headline keywords overall and per category. When that document is missing
//! or unreadable the same ranking is computed from the aggregated headlines.

use crate::aggregator::NewsAggregator;
use crate::models::Article;
use crate::source::{ShardSource, trend_path};
use chrono::{DateTime, FixedOffset, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, instrument};

/// Keywords kept in the overall ranking.
pub const DAILY_TOP_N: usize = 20;
/// Keywords kept per category.
pub const CATEGORY_TOP_N: usize = 5;

/// Runs of 2 to 10 Hangul syllables.
static HANGUL_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[가-힣]{2,10}").expect("static keyword pattern is valid"));

/// Words too common in headlines to say anything about the day.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "있다", "없다", "하다", "되다", "이다", "아니다", "그리고", "그러나", "하지만", "또한",
        "있는", "없는", "하는", "되는", "이는", "것은", "것이", "것을", "우리", "저희", "이번",
        "오늘", "어제", "내일", "올해", "작년", "내년", "통해", "위해", "대해", "관련", "따르면",
        "밝혔다", "전했다", "말했다", "이라고", "라고", "한다", "한다고", "했다", "했다고", "될",
        "될까", "기자", "뉴스", "속보", "단독", "특종", "취재", "보도", "발표", "공개", "확인",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Keyword {
    pub word: String,
    pub count: usize,
}

/// Ranked keywords for one day.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrendReport {
    pub date: NaiveDate,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub daily_top_keywords: Vec<Keyword>,
    #[serde(default)]
    pub category_keywords: BTreeMap<String, Vec<Keyword>>,
    /// Set when the report was computed here instead of fetched.
    #[serde(skip)]
    pub computed_locally: bool,
}

/// Keywords found in one headline, stopwords removed.
pub fn extract_keywords(text: &str) -> Vec<&str> {
    HANGUL_WORD
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| !STOPWORDS.contains(w))
        .collect()
}

/// The `top_n` most frequent headline keywords; ties keep first-seen order.
pub fn rank_keywords<'a>(articles: impl IntoIterator<Item = &'a Article>, top_n: usize) -> Vec<Keyword> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for article in articles {
        for word in extract_keywords(&article.title) {
            let first_seen = counts.len();
            counts.entry(word).or_insert((0, first_seen)).0 += 1;
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first_seen))| (word, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(word, count, _)| Keyword {
            word: word.to_string(),
            count,
        })
        .collect()
}

/// Build a report from already aggregated articles.
pub fn compute_report(
    date: NaiveDate,
    articles: &[Article],
    categories: &[String],
    now: &DateTime<FixedOffset>,
) -> TrendReport {
    let category_keywords = categories
        .iter()
        .map(|category| {
            let ranked = rank_keywords(
                articles.iter().filter(|a| &a.category == category),
                CATEGORY_TOP_N,
            );
            (category.clone(), ranked)
        })
        .collect();

    TrendReport {
        date,
        generated_at: Some(now.to_rfc3339()),
        daily_top_keywords: rank_keywords(articles, DAILY_TOP_N),
        category_keywords,
        computed_locally: true,
    }
}

/// The published trend document for `date`, if it can be read.
#[instrument(level = "info", skip(aggregator))]
pub async fn published_report<S: ShardSource>(
    aggregator: &NewsAggregator<S>,
    date: NaiveDate,
) -> Option<TrendReport> {
    match aggregator.fetch_json::<TrendReport>(&trend_path(date)).await {
        Ok(report) => {
            info!(keywords = report.daily_top_keywords.len(), "Loaded published trends");
            Some(report)
        }
        Err(e) => {
            info!(error = %e, "Published trends unavailable; computing from headlines");
            None
        }
    }
}

/// Trend report for `date`: the published document, or a local computation
/// over every category and source when it cannot be read.
pub async fn trend_report<S: ShardSource>(
    aggregator: &NewsAggregator<S>,
    date: NaiveDate,
    now: &DateTime<FixedOffset>,
) -> TrendReport {
    match published_report(aggregator, date).await {
        Some(report) => report,
        None => {
            let articles = aggregator.aggregate_all(date, now).await;
            compute_report(date, &articles, &aggregator.options().categories, now)
        }
    }
}
