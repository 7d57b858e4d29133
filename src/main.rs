//! Terminal front end of the news portal.
//!
//! Reads the published news shards, prints the requested screen as Markdown
//! (or JSON for the data commands) on stdout and keeps bookmarks and the theme
//! in a local state file. Logs go to stderr.
//!
//! ## Usage
//!
//! ```sh
//! news_portal --data-dir ./data news -c politics -s donga
//! news_portal --data-url https://example.github.io/news/data home
//! news_portal bookmarks list
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::Parser;
use news_portal::aggregator::NewsAggregator;
use news_portal::app::{AppSettings, AppState, AuthGate};
use news_portal::cli::{BookmarkAction, Cli, Command, Selection, ThemeAction};
use news_portal::config::Config;
use news_portal::models::Edition;
use news_portal::outputs::{json, markdown};
use news_portal::slots::available_slots;
use news_portal::source::DataSource;
use news_portal::stats::Statistics;
use news_portal::store::FileStore;
use news_portal::trends::trend_report;
use news_portal::utils::{ensure_writable_dir, local_now};
use news_portal::views::View;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

type Portal = AppState<DataSource, FileStore>;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_portal starting up");

    let args = Cli::parse();
    debug!(?args.command, config = %args.config.display(), "Parsed CLI arguments");

    let mut config = Config::load(&args.config)?;
    args.apply_overrides(&mut config);
    let offset = config.offset()?;
    let now = match args.now {
        Some(fixed) => fixed.with_timezone(&offset),
        None => local_now(offset),
    };
    info!(now = %now.to_rfc3339(), "Portal clock");

    let aggregator = NewsAggregator::new(config.data_source()?, config.aggregator_options());
    let store = FileStore::new(&config.state_file);
    let mut app = AppState::new(
        aggregator,
        store,
        AppSettings {
            bookmark_limit: config.bookmark_limit,
            ticker_limit: config.ticker_limit,
            gate: AuthGate {
                authenticated: args.authenticated,
                bypass: config.auth_bypass,
            },
        },
    );

    run(&mut app, args.command, &config, &now).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn run(
    app: &mut Portal,
    command: Command,
    config: &Config,
    now: &DateTime<FixedOffset>,
) -> Result<(), Box<dyn Error>> {
    let today = now.date_naive();

    match command {
        Command::News(selection) => {
            let date = select(app, &selection, today);
            println!("{}", markdown::render(&app.news_view(date, now).await));
        }
        Command::Home { category } => {
            if let Some(category) = category {
                let source = app.selection().1.to_string();
                app.select(&category, &source);
            }
            println!("{}", markdown::render(&app.home_view(now).await));
        }
        Command::Ticker { limit } => {
            if !require_session(app) {
                return Ok(());
            }
            let limit = limit.unwrap_or(config.ticker_limit);
            for article in app.aggregator().ticker(now, limit).await {
                println!("{}", markdown::ticker_line(&article));
            }
        }
        Command::Trends { date } => {
            if !require_session(app) {
                return Ok(());
            }
            let report = trend_report(app.aggregator(), date.unwrap_or(today), now).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Stats { date } => {
            if !require_session(app) {
                return Ok(());
            }
            let articles = app.aggregator().aggregate_all(date.unwrap_or(today), now).await;
            println!("{}", serde_json::to_string_pretty(&Statistics::from_articles(&articles))?);
        }
        Command::Dates {
            category,
            source,
            days,
        } => {
            if !require_session(app) {
                return Ok(());
            }
            select(
                app,
                &Selection {
                    category,
                    source,
                    date: None,
                },
                today,
            );
            let (category, source) = app.selection();
            let dates = app
                .aggregator()
                .available_dates(category, source, days, now)
                .await;
            for date in dates {
                println!("{date}");
            }
        }
        Command::Bookmarks { action } => bookmarks(app, action, today, now).await?,
        Command::Theme { action } => {
            let theme = match action {
                ThemeAction::Show => app.theme(),
                ThemeAction::Toggle => app.toggle_theme()?,
                ThemeAction::Set { theme } => {
                    app.set_theme(theme)?;
                    theme
                }
            };
            println!("{theme}");
        }
        Command::Export {
            selection,
            json_output_dir,
        } => {
            if !require_session(app) {
                return Ok(());
            }
            // Early check: fail before fetching if the output cannot be written.
            if let Err(e) = ensure_writable_dir(&json_output_dir).await {
                error!(
                    path = %json_output_dir,
                    error = %e,
                    "JSON output directory is not writable (fix perms or choose a different path)"
                );
                return Err(e);
            }
            let date = select(app, &selection, today);
            let (category, source) = app.selection();
            let edition = Edition {
                date,
                category: category.to_string(),
                source: source.to_string(),
                slots: available_slots(date, now),
                generated_at: Utc::now(),
                articles: app.aggregator().aggregate(category, source, date, now).await,
            };
            let path = json::write_edition(&edition, &json_output_dir).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn bookmarks(
    app: &mut Portal,
    action: BookmarkAction,
    today: NaiveDate,
    now: &DateTime<FixedOffset>,
) -> Result<(), Box<dyn Error>> {
    match action {
        BookmarkAction::List => println!("{}", markdown::render(&app.bookmark_view())),
        BookmarkAction::Toggle { target, selection } => {
            if !require_session(app) {
                return Ok(());
            }
            let date = select(app, &selection, today);
            match app.toggle_bookmark(&target, date, now).await {
                Ok(Some(true)) => println!("★ bookmarked"),
                Ok(Some(false)) => println!("☆ removed"),
                Ok(None) => println!("No article matching {target} in this grid"),
                Err(e) => warn!(error = %e, "Bookmark changed but could not be saved"),
            }
        }
        BookmarkAction::Remove { id } => {
            if !require_session(app) {
                return Ok(());
            }
            if let Err(e) = app.remove_bookmark(&id) {
                warn!(error = %e, "Bookmark removed but could not be saved");
            }
        }
    }
    Ok(())
}

/// Apply a selection to the app and return the requested date.
fn select(app: &mut Portal, selection: &Selection, today: NaiveDate) -> NaiveDate {
    let (current_category, current_source) = app.selection();
    let category = selection
        .category
        .clone()
        .unwrap_or_else(|| current_category.to_string());
    let source = selection
        .source
        .clone()
        .unwrap_or_else(|| current_source.to_string());
    app.select(&category, &source);
    selection.date.unwrap_or(today)
}

/// Print the locked screen and return false when no session is available.
fn require_session(app: &Portal) -> bool {
    if app.gate().allows_render() {
        return true;
    }
    println!("{}", markdown::render(&View::Locked));
    false
}
