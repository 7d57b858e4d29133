//! View models for the portal's screens.
//!
//! Each screen is one variant of [`View`]; rendering is a pure function per
//! variant in [`crate::outputs::markdown`].

use crate::aggregator::EmptyState;
use crate::models::{Article, Bookmark};
use crate::slots::TimeSlot;
use crate::stats::Statistics;
use crate::theme::Theme;
use crate::trends::TrendReport;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub enum View {
    Home(HomeView),
    NewsGrid(NewsGridView),
    Bookmarks(BookmarkView),
    /// Shown instead of any screen until a session is established.
    Locked,
}

/// Landing screen: banner, ticker, trends and statistics.
#[derive(Debug, Clone)]
pub struct HomeView {
    pub date: NaiveDate,
    pub category: String,
    pub theme: Theme,
    pub banner: Vec<Article>,
    pub ticker: Vec<Article>,
    pub trends: TrendReport,
    pub stats: Statistics,
}

/// One card in the news grid.
#[derive(Debug, Clone)]
pub struct NewsCard {
    pub article: Article,
    pub bookmarked: bool,
}

/// Articles for the selected category and source on one day.
#[derive(Debug, Clone)]
pub struct NewsGridView {
    pub category: String,
    pub source: String,
    pub date: NaiveDate,
    pub theme: Theme,
    pub slots: Vec<TimeSlot>,
    pub cards: Vec<NewsCard>,
    /// Set when `cards` is empty.
    pub empty: Option<EmptyState>,
}

#[derive(Debug, Clone)]
pub struct BookmarkView {
    pub theme: Theme,
    pub entries: Vec<Bookmark>,
}
