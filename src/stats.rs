//! Article counts for the statistics dashboard.

use crate::models::Article;
use crate::slots::TimeSlot;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_source: BTreeMap<String, usize>,
    pub by_slot: BTreeMap<TimeSlot, usize>,
    /// Articles read from legacy (un-slotted) shards.
    pub unslotted: usize,
}

impl Statistics {
    pub fn from_articles(articles: &[Article]) -> Self {
        let mut stats = Statistics {
            total: articles.len(),
            ..Statistics::default()
        };
        for article in articles {
            *stats.by_category.entry(article.category.clone()).or_default() += 1;
            *stats.by_source.entry(article.source.clone()).or_default() += 1;
            match article.slot {
                Some(slot) => *stats.by_slot.entry(slot).or_default() += 1,
                None => stats.unslotted += 1,
            }
        }
        stats
    }
}
