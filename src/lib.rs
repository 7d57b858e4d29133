//! # News Portal
//!
//! Client-side data layer of a multi-source Korean news portal. A crawler
//! publishes one JSON shard per category, newspaper, day and time-slot; this
//! crate reads those shards, decides which slots may exist yet, merges and
//! deduplicates them, and builds the screens the portal shows.
//!
//! ## Features
//!
//! - Three daily editions (09:20, 15:00 and 19:00 in the portal's time zone)
//!   gated on the clock so unpublished editions are never requested
//! - Reads shards over HTTP or from a local checkout of the data tree
//! - Order-stable concurrent fetching; failed or malformed shards are skipped
//! - Bookmarks (capped, most recent first) and a light/dark theme persisted
//!   to a JSON state file
//! - Trending headline keywords, published or computed locally
//! - Markdown rendering of every screen and JSON export of editions
//!
//! ## Architecture
//!
//! 1. **Slots**: [`slots::available_slots`] decides which editions can exist
//! 2. **Fetching**: [`source::ShardSource`] returns raw shard documents
//! 3. **Aggregation**: [`aggregator::NewsAggregator`] tags, concatenates and
//!    deduplicates articles
//! 4. **Views**: [`app::AppState`] turns aggregates, bookmarks and theme into
//!    a [`views::View`]
//! 5. **Output**: [`outputs::markdown::render`] and
//!    [`outputs::json::write_edition`]

pub mod aggregator;
pub mod app;
pub mod bookmarks;
pub mod cli;
pub mod config;
pub mod models;
pub mod outputs;
pub mod slots;
pub mod source;
pub mod stats;
pub mod store;
pub mod theme;
pub mod trends;
pub mod utils;
pub mod views;
