//! Command-line interface definitions for the news portal.
//!
//! Global options can be provided via command-line flags or environment
//! variables and override the values from the config file.

use crate::aggregator::MAX_LOOKBACK_DAYS;
use crate::config::Config;
use crate::theme::Theme;
use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the news portal.
///
/// # Examples
///
/// ```sh
/// # Today's politics news from Donga, read from a local data checkout
/// news_portal --data-dir ./data news -c politics -s donga
///
/// # Landing page against the published site, as of a fixed time
/// news_portal --data-url https://example.github.io/news/data \
///     --now 2025-12-16T10:00:00+09:00 home
///
/// # Bookmark an article from the current grid
/// news_portal bookmarks toggle https://www.donga.com/news/article/1
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, env = "NEWS_PORTAL_CONFIG", default_value = "news_portal.yaml")]
    pub config: PathBuf,

    /// Base URL of the published data tree
    #[arg(long, env = "NEWS_PORTAL_DATA_URL", conflicts_with = "data_dir")]
    pub data_url: Option<String>,

    /// Local directory holding the data tree
    #[arg(long, env = "NEWS_PORTAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON file holding bookmarks and the theme
    #[arg(long, env = "NEWS_PORTAL_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Evaluate slot availability as of this RFC 3339 time instead of the clock
    #[arg(long)]
    pub now: Option<DateTime<FixedOffset>>,

    /// A session has been established with the identity provider
    #[arg(long, env = "NEWS_PORTAL_AUTHENTICATED")]
    pub authenticated: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply flag values on top of `config`.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.data_url {
            config.data_url = Some(url.clone());
        }
        if let Some(dir) = &self.data_dir {
            config.data_url = None;
            config.data_dir = dir.clone();
        }
        if let Some(state_file) = &self.state_file {
            config.state_file = state_file.clone();
        }
    }
}

/// Which articles a command is about. Missing values default to the first
/// configured category and source, and to today.
#[derive(Args, Debug, Clone, Default)]
pub struct Selection {
    /// Category id (politics, sports, economy, society, international, culture)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Source id (donga, chosun, joongang)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Day to read, YYYY-MM-DD
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// News grid for one category and source
    News(Selection),

    /// Landing page: banner, live ticker, trending keywords and statistics
    Home {
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Most recently crawled articles across every category
    Ticker {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Trending headline keywords, as JSON
    Trends {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Article counts by category, source and time-slot, as JSON
    Stats {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Recent days that have articles for a category and source
    Dates {
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        source: Option<String>,

        /// How many days back to look, today included (at most a year)
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_LOOKBACK_DAYS))
        )]
        days: u32,
    },

    /// Manage saved articles
    Bookmarks {
        #[command(subcommand)]
        action: BookmarkAction,
    },

    /// Show or change the light/dark theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Write an aggregated edition snapshot as JSON
    Export {
        #[command(flatten)]
        selection: Selection,

        /// Output directory for the JSON files
        #[arg(short = 'j', long, env = "NEWS_PORTAL_JSON_OUTPUT_DIR", default_value = "json")]
        json_output_dir: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookmarkAction {
    /// List saved articles, most recent first
    List,

    /// Save or unsave an article of the selected grid by URL or bookmark id
    Toggle {
        target: String,

        #[command(flatten)]
        selection: Selection,
    },

    /// Remove a saved article by bookmark id
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    Show,
    Toggle,
    Set { theme: Theme },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_portal",
            "--data-dir",
            "./data",
            "--now",
            "2025-12-16T10:00:00+09:00",
            "news",
            "--category",
            "sports",
            "--date",
            "2025-12-15",
        ]);

        assert_eq!(cli.data_dir, Some(PathBuf::from("./data")));
        assert_eq!(cli.now.unwrap().to_rfc3339(), "2025-12-16T10:00:00+09:00");
        let Command::News(selection) = cli.command else {
            panic!("expected news command");
        };
        assert_eq!(selection.category.as_deref(), Some("sports"));
        assert_eq!(selection.source, None);
        assert_eq!(selection.date, Some("2025-12-15".parse().unwrap()));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["news_portal", "export", "-c", "economy", "-s", "chosun", "-j", "/tmp/json"]);

        let Command::Export {
            selection,
            json_output_dir,
        } = cli.command
        else {
            panic!("expected export command");
        };
        assert_eq!(selection.category.as_deref(), Some("economy"));
        assert_eq!(selection.source.as_deref(), Some("chosun"));
        assert_eq!(json_output_dir, "/tmp/json");
    }

    #[test]
    fn test_nested_subcommands() {
        let cli = Cli::parse_from(["news_portal", "theme", "set", "dark"]);
        assert!(matches!(
            cli.command,
            Command::Theme {
                action: ThemeAction::Set { theme: Theme::Dark }
            }
        ));

        let cli = Cli::parse_from(["news_portal", "bookmarks", "toggle", "https://a/1", "-c", "culture"]);
        let Command::Bookmarks {
            action: BookmarkAction::Toggle { target, selection },
        } = cli.command
        else {
            panic!("expected bookmark toggle");
        };
        assert_eq!(target, "https://a/1");
        assert_eq!(selection.category.as_deref(), Some("culture"));
    }

    #[test]
    fn test_data_url_conflicts_with_data_dir() {
        let result = Cli::try_parse_from([
            "news_portal",
            "--data-url",
            "https://example.com/data",
            "--data-dir",
            "./data",
            "home",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dates_lookback_bounds() {
        for bad in ["0", "367", "4294967295"] {
            assert!(Cli::try_parse_from(["news_portal", "dates", "--days", bad]).is_err(), "{bad}");
        }
        let cli = Cli::try_parse_from(["news_portal", "dates", "--days", "366"]).unwrap();
        let Command::Dates { days, .. } = cli.command else {
            panic!("expected dates");
        };
        assert_eq!(days, 366);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from(["news_portal", "--data-dir", "/srv/data", "--state-file", "/tmp/s.json", "home"]);
        let mut config = Config {
            data_url: Some("https://example.com/data".to_string()),
            ..Config::default()
        };
        cli.apply_overrides(&mut config);

        assert_eq!(config.data_url, None);
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.state_file, PathBuf::from("/tmp/s.json"));
    }
}
