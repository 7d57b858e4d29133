//! Application state and screen controller.
//!
//! [`AppState`] owns everything the portal keeps between user actions: the
//! aggregator, the current category/source selection, the bookmark list, the
//! theme and the authentication gate. Screens are produced as [`View`] values.

use crate::aggregator::{NewsAggregator, empty_state, newest_first};
use crate::bookmarks::BookmarkStore;
use crate::models::Article;
use crate::slots::available_slots;
use crate::source::ShardSource;
use crate::stats::Statistics;
use crate::store::{KeyValueStore, StoreError};
use crate::theme::{Theme, load_theme, save_theme};
use crate::trends::{compute_report, published_report};
use crate::views::{BookmarkView, HomeView, NewsCard, NewsGridView, View};
use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::{info, instrument, warn};

/// The authentication collaborator, reduced to what rendering needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthGate {
    /// A session has been established with the identity provider.
    pub authenticated: bool,
    /// Skip the gate (automated testing, offline use).
    pub bypass: bool,
}

impl AuthGate {
    pub fn allows_render(&self) -> bool {
        self.authenticated || self.bypass
    }
}

/// Settings for [`AppState::new`].
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub bookmark_limit: usize,
    pub ticker_limit: usize,
    pub gate: AuthGate,
}

pub struct AppState<S, K> {
    aggregator: NewsAggregator<S>,
    store: K,
    bookmarks: BookmarkStore<K>,
    theme: Theme,
    category: String,
    source: String,
    gate: AuthGate,
    ticker_limit: usize,
}

impl<S: ShardSource, K: KeyValueStore + Clone> AppState<S, K> {
    /// Load persisted bookmarks and theme, and select the first configured
    /// category and source.
    ///
    /// State that cannot be read is logged and replaced by an empty bookmark
    /// list and the default theme; reading news never depends on it.
    pub fn new(aggregator: NewsAggregator<S>, store: K, settings: AppSettings) -> Self {
        let bookmarks = BookmarkStore::load(store.clone(), settings.bookmark_limit).unwrap_or_else(|e| {
            warn!(error = %e, "Saved bookmarks unavailable; starting with none");
            BookmarkStore::empty(store.clone(), settings.bookmark_limit)
        });
        let theme = load_theme(&store).unwrap_or_else(|e| {
            warn!(error = %e, "Saved theme unavailable; using the default");
            Theme::default()
        });
        let category = aggregator
            .options()
            .categories
            .first()
            .cloned()
            .unwrap_or_else(|| "politics".to_string());
        let source = aggregator
            .options()
            .sources
            .first()
            .cloned()
            .unwrap_or_else(|| "donga".to_string());

        Self {
            aggregator,
            store,
            bookmarks,
            theme,
            category,
            source,
            gate: settings.gate,
            ticker_limit: settings.ticker_limit,
        }
    }

    pub fn aggregator(&self) -> &NewsAggregator<S> {
        &self.aggregator
    }

    pub fn bookmarks(&self) -> &BookmarkStore<K> {
        &self.bookmarks
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn gate(&self) -> AuthGate {
        self.gate
    }

    pub fn selection(&self) -> (&str, &str) {
        (&self.category, &self.source)
    }

    pub fn select(&mut self, category: &str, source: &str) {
        self.category = category.to_string();
        self.source = source.to_string();
        info!(%category, %source, "Selection changed");
    }

    /// Landing screen for the selected category.
    #[instrument(level = "info", skip_all)]
    pub async fn home_view(&self, now: &DateTime<FixedOffset>) -> View {
        if !self.gate.allows_render() {
            return View::Locked;
        }
        let today = now.date_naive();
        let banner = self.aggregator.latest(&self.category, now).await;
        let all = self.aggregator.aggregate_all(today, now).await;
        let trends = match published_report(&self.aggregator, today).await {
            Some(report) => report,
            None => compute_report(today, &all, &self.aggregator.options().categories, now),
        };
        let stats = Statistics::from_articles(&all);

        View::Home(HomeView {
            date: today,
            category: self.category.clone(),
            theme: self.theme,
            banner,
            ticker: newest_first(all, self.ticker_limit),
            trends,
            stats,
        })
    }

    /// News grid for the selected category and source on `date`.
    #[instrument(level = "info", skip(self, now))]
    pub async fn news_view(&self, date: NaiveDate, now: &DateTime<FixedOffset>) -> View {
        if !self.gate.allows_render() {
            return View::Locked;
        }
        let articles = self
            .aggregator
            .aggregate(&self.category, &self.source, date, now)
            .await;
        let empty = articles
            .is_empty()
            .then(|| empty_state(date, now.date_naive()));
        let cards = articles
            .into_iter()
            .map(|article| NewsCard {
                bookmarked: self.bookmarks.is_bookmarked(&article.bookmark_id()),
                article,
            })
            .collect();

        View::NewsGrid(NewsGridView {
            category: self.category.clone(),
            source: self.source.clone(),
            date,
            theme: self.theme,
            slots: available_slots(date, now),
            cards,
            empty,
        })
    }

    pub fn bookmark_view(&self) -> View {
        if !self.gate.allows_render() {
            return View::Locked;
        }
        View::Bookmarks(BookmarkView {
            theme: self.theme,
            entries: self.bookmarks.entries().to_vec(),
        })
    }

    /// Toggle the article of the current selection on `date` whose URL or
    /// bookmark id is `target`. `Ok(None)` when no such article exists.
    #[instrument(level = "info", skip(self, now))]
    pub async fn toggle_bookmark(
        &mut self,
        target: &str,
        date: NaiveDate,
        now: &DateTime<FixedOffset>,
    ) -> Result<Option<bool>, StoreError> {
        let articles = self
            .aggregator
            .aggregate(&self.category, &self.source, date, now)
            .await;
        let found: Option<Article> = articles
            .into_iter()
            .find(|a| a.url == target || a.bookmark_id() == target);

        match found {
            Some(article) => self.bookmarks.toggle(&article).map(Some),
            None => {
                warn!(%target, "No article to bookmark in the current selection");
                Ok(None)
            }
        }
    }

    pub fn remove_bookmark(&mut self, id: &str) -> Result<(), StoreError> {
        self.bookmarks.remove(id)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.theme = theme;
        save_theme(&mut self.store, theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StoreError> {
        let next = self.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}
