//! Markdown rendering of portal views.
//!
//! [`render`] is pure: the same [`View`] always renders to the same text.
//! Each variant has its own writer.

use crate::aggregator::EmptyState;
use crate::models::{Article, category_label, default_image, source_label};
use crate::stats::Statistics;
use crate::trends::{Keyword, TrendReport};
use crate::utils::{format_date, upcase};
use crate::views::{BookmarkView, HomeView, NewsGridView, View};
use std::fmt::{self, Write};

/// Widest bar in the statistics charts, in cells.
const BAR_WIDTH: usize = 24;

/// Render a view as Markdown.
pub fn render(view: &View) -> String {
    Markdown(view).to_string()
}

struct Markdown<'a>(&'a View);

impl fmt::Display for Markdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            View::Home(home) => write_home(f, home),
            View::NewsGrid(grid) => write_news_grid(f, grid),
            View::Bookmarks(bookmarks) => write_bookmarks(f, bookmarks),
            View::Locked => {
                writeln!(f, "# 🔒 Sign-in required\n")?;
                writeln!(f, "Sign in to read the news portal.")
            }
        }
    }
}

fn write_home(f: &mut impl Write, home: &HomeView) -> fmt::Result {
    writeln!(
        f,
        "# 📰 {} · {}",
        category_label(&home.category),
        format_date(&home.date.to_string())
    )?;
    writeln!(f, "<small>theme: {}</small>\n", home.theme)?;

    writeln!(f, "## Headlines\n")?;
    if home.banner.is_empty() {
        writeln!(f, "_No headlines yet._")?;
    }
    for (i, article) in home.banner.iter().enumerate() {
        writeln!(f, "{}. {}", i + 1, headline(article))?;
    }

    writeln!(f, "\n## Live\n")?;
    if home.ticker.is_empty() {
        writeln!(f, "_Nothing crawled yet today._")?;
    }
    for article in &home.ticker {
        writeln!(f, "{}", ticker_line(article))?;
    }

    write_trends(f, &home.trends)?;
    write_stats(f, &home.stats)
}

fn write_trends(f: &mut impl Write, trends: &TrendReport) -> fmt::Result {
    writeln!(f, "\n## Trending keywords\n")?;
    if trends.daily_top_keywords.is_empty() {
        return writeln!(f, "_Not enough headlines to rank._");
    }
    for (i, keyword) in trends.daily_top_keywords.iter().enumerate() {
        writeln!(f, "{}. {} ({})", i + 1, escape_text(&keyword.word), keyword.count)?;
    }

    for (category, keywords) in trends.category_keywords.iter().filter(|(_, k)| !k.is_empty()) {
        writeln!(f, "\n### {}\n", category_label(category))?;
        writeln!(f, "{}", inline_keywords(keywords))?;
    }
    Ok(())
}

fn inline_keywords(keywords: &[Keyword]) -> String {
    keywords
        .iter()
        .map(|k| format!("`{}` {}", k.word, k.count))
        .collect::<Vec<_>>()
        .join(" · ")
}

fn write_stats(f: &mut impl Write, stats: &Statistics) -> fmt::Result {
    writeln!(f, "\n## Statistics\n")?;
    writeln!(f, "Total articles today: **{}**", stats.total)?;

    let by_category: Vec<(String, usize)> = stats
        .by_category
        .iter()
        .map(|(k, v)| (category_label(k).to_string(), *v))
        .collect();
    let by_source: Vec<(String, usize)> = stats
        .by_source
        .iter()
        .map(|(k, v)| (source_label(k).to_string(), *v))
        .collect();
    let mut by_slot: Vec<(String, usize)> = stats
        .by_slot
        .iter()
        .map(|(slot, v)| (format!("{} {}", upcase(slot.as_str()), slot.file_stamp()), *v))
        .collect();
    if stats.unslotted > 0 {
        by_slot.push(("Legacy".to_string(), stats.unslotted));
    }

    write_chart(f, "By category", &by_category)?;
    write_chart(f, "By source", &by_source)?;
    write_chart(f, "By time-slot", &by_slot)
}

fn write_chart(f: &mut impl Write, title: &str, counts: &[(String, usize)]) -> fmt::Result {
    if counts.is_empty() {
        return Ok(());
    }
    writeln!(f, "\n### {title}\n")?;
    writeln!(f, "```text")?;
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let label_width = counts.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (label, count) in counts {
        let pad = label_width - label.chars().count();
        writeln!(
            f,
            "{label}{} {} {count}",
            " ".repeat(pad),
            bar(*count, max)
        )?;
    }
    writeln!(f, "```")
}

/// A bar scaled so `max` spans [`BAR_WIDTH`] cells; non-zero counts get at
/// least one cell.
fn bar(count: usize, max: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let cells = (count * BAR_WIDTH / max).max(1);
    "█".repeat(cells)
}

/// One live-ticker entry.
pub fn ticker_line(article: &Article) -> String {
    format!(
        "- [{}] {} <small>`{}`</small>",
        category_label(&article.category),
        escape_text(&article.title),
        source_label(&article.source)
    )
}

/// Backslash-escape characters that would open emphasis, code, links or
/// inline HTML.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Percent-encode characters that would end a link destination early.
fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            c if c.is_whitespace() => out.push_str("%20"),
            c => out.push(c),
        }
    }
    out
}

fn headline(article: &Article) -> String {
    format!(
        "[{}] [{}]({}) <small>`{}` {}</small>",
        category_label(&article.category),
        escape_text(&article.title),
        escape_url(&article.url),
        source_label(&article.source),
        format_date(&article.date)
    )
}

fn write_news_grid(f: &mut impl Write, grid: &NewsGridView) -> fmt::Result {
    writeln!(
        f,
        "# {} · {} · {}\n",
        category_label(&grid.category),
        source_label(&grid.source),
        format_date(&grid.date.to_string())
    )?;

    if !grid.slots.is_empty() {
        let slots = grid
            .slots
            .iter()
            .map(|s| upcase(s.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "_Editions: {slots}_\n")?;
    }

    if let Some(empty) = grid.empty {
        return writeln!(f, "{}", empty_message(empty, &grid.date.to_string()));
    }

    for (i, card) in grid.cards.iter().enumerate() {
        let article = &card.article;
        let marker = if card.bookmarked { "★" } else { "☆" };
        writeln!(f, "### {}. {marker} {}\n", i + 1, escape_text(&article.title))?;
        writeln!(f, "- 🗓 {}", format_date(&article.date))?;
        if let Some(slot) = article.slot {
            writeln!(f, "- 🕘 {}", upcase(slot.as_str()))?;
        }
        writeln!(f, "- 🔗 <{}>", escape_url(&article.url))?;
        let image = article
            .image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| default_image(&article.category));
        writeln!(f, "- 🖼 {}", escape_url(image))?;
        writeln!(f, "- id `{}`\n", article.bookmark_id())?;
    }
    Ok(())
}

fn empty_message(state: EmptyState, date: &str) -> String {
    match state {
        EmptyState::NotYetPublished => {
            "_No news yet. The next edition appears after its publish time._".to_string()
        }
        EmptyState::NeverPublished => format!("_No news was published on {}._", format_date(date)),
    }
}

fn write_bookmarks(f: &mut impl Write, view: &BookmarkView) -> fmt::Result {
    writeln!(f, "# ★ Bookmarks ({})\n", view.entries.len())?;
    if view.entries.is_empty() {
        return writeln!(f, "_No bookmarks yet._");
    }
    for bookmark in &view.entries {
        writeln!(
            f,
            "- [{}]({}) <small>`{}` {} · {}</small> id `{}`",
            escape_text(&bookmark.title),
            escape_url(&bookmark.url),
            source_label(&bookmark.source),
            category_label(&bookmark.category),
            format_date(&bookmark.date),
            bookmark.id
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bookmark;
    use crate::slots::TimeSlot;
    use crate::theme::Theme;
    use crate::views::NewsCard;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn day() -> NaiveDate {
        "2025-12-16".parse().unwrap()
    }

    fn article(title: &str, url: &str, image: Option<&str>) -> Article {
        Article {
            title: title.to_string(),
            url: url.to_string(),
            date: "2025-12-16".to_string(),
            category: "politics".to_string(),
            source: "donga".to_string(),
            image_url: image.map(str::to_string),
            scraped_at: None,
            slot: Some(TimeSlot::Morning),
        }
    }

    fn grid(cards: Vec<NewsCard>, empty: Option<EmptyState>) -> View {
        View::NewsGrid(NewsGridView {
            category: "politics".to_string(),
            source: "donga".to_string(),
            date: day(),
            theme: Theme::Light,
            slots: vec![TimeSlot::Morning],
            cards,
            empty,
        })
    }

    #[test]
    fn test_news_grid_marks_bookmarks_and_default_images() {
        let md = render(&grid(
            vec![
                NewsCard {
                    article: article("국회 본회의", "https://a/1", None),
                    bookmarked: true,
                },
                NewsCard {
                    article: article("예산안", "https://a/2", Some("https://img/2.jpg")),
                    bookmarked: false,
                },
            ],
            None,
        ));

        assert!(md.starts_with("# 정치 · 동아일보 · 2025.12.16"));
        assert!(md.contains("_Editions: Morning_"));
        assert!(md.contains("### 1. ★ 국회 본회의"));
        assert!(md.contains("### 2. ☆ 예산안"));
        assert!(md.contains("- 🖼 static/images/politics-default.jpg"));
        assert!(md.contains("- 🖼 https://img/2.jpg"));
        assert!(md.contains("- 🗓 2025.12.16"));
    }

    #[test]
    fn test_news_grid_empty_states() {
        let pending = render(&grid(Vec::new(), Some(EmptyState::NotYetPublished)));
        assert!(pending.contains("No news yet"));

        let never = render(&grid(Vec::new(), Some(EmptyState::NeverPublished)));
        assert!(never.contains("No news was published on 2025.12.16"));
    }

    #[test]
    fn test_render_is_pure() {
        let view = grid(
            vec![NewsCard {
                article: article("같은 기사", "https://a/1", None),
                bookmarked: false,
            }],
            None,
        );
        assert_eq!(render(&view), render(&view));
    }

    #[test]
    fn test_locked() {
        assert!(render(&View::Locked).contains("Sign-in required"));
    }

    #[test]
    fn test_bookmarks() {
        let at = Utc.with_ymd_and_hms(2025, 12, 16, 1, 0, 0).unwrap();
        let bookmark = Bookmark::from_article(&article("국회 본회의", "https://a/1", None), at);
        let md = render(&View::Bookmarks(BookmarkView {
            theme: Theme::Dark,
            entries: vec![bookmark.clone()],
        }));
        assert!(md.starts_with("# ★ Bookmarks (1)"));
        assert!(md.contains(&format!("id `{}`", bookmark.id)));
        assert!(md.contains("동아일보"));

        let empty = render(&View::Bookmarks(BookmarkView {
            theme: Theme::Light,
            entries: Vec::new(),
        }));
        assert!(empty.contains("No bookmarks yet"));
    }

    #[test]
    fn test_home_sections() {
        let mut stats = Statistics::from_articles(&[
            article("a", "u1", None),
            article("b", "u2", None),
        ]);
        stats.unslotted = 1;
        let trends = TrendReport {
            date: day(),
            generated_at: None,
            daily_top_keywords: vec![Keyword {
                word: "국회".to_string(),
                count: 3,
            }],
            category_keywords: BTreeMap::from([(
                "politics".to_string(),
                vec![Keyword {
                    word: "국회".to_string(),
                    count: 3,
                }],
            )]),
            computed_locally: true,
        };
        let md = render(&View::Home(HomeView {
            date: day(),
            category: "politics".to_string(),
            theme: Theme::Dark,
            banner: vec![article("헤드라인", "https://a/1", None)],
            ticker: Vec::new(),
            trends,
            stats,
        }));

        assert!(md.starts_with("# 📰 정치 · 2025.12.16"));
        assert!(md.contains("theme: dark"));
        assert!(md.contains("1. [정치] [헤드라인](https://a/1)"));
        assert!(md.contains("_Nothing crawled yet today._"));
        assert!(md.contains("1. 국회 (3)"));
        assert!(md.contains("`국회` 3"));
        assert!(md.contains("Morning 09-20"));
        assert!(md.contains("Legacy"));
    }

    #[test]
    fn test_link_text_and_targets_are_escaped() {
        let tricky = article("속보] [클릭](https://evil) *강조*", "https://a/x?(1) 2", None);
        let md = render(&View::Home(HomeView {
            date: day(),
            category: "politics".to_string(),
            theme: Theme::Light,
            banner: vec![tricky.clone()],
            ticker: vec![tricky.clone()],
            trends: TrendReport {
                date: day(),
                generated_at: None,
                daily_top_keywords: Vec::new(),
                category_keywords: BTreeMap::new(),
                computed_locally: true,
            },
            stats: Statistics::from_articles(&[]),
        }));

        assert!(md.contains(
            "[속보\\] \\[클릭\\](https://evil) \\*강조\\*](https://a/x?%281%29%202)"
        ));
        assert!(md.contains("- [정치] 속보\\] \\[클릭\\](https://evil) \\*강조\\* <small>"));

        let grid = render(&grid(
            vec![NewsCard {
                article: tricky,
                bookmarked: false,
            }],
            None,
        ));
        assert!(grid.contains("- 🔗 <https://a/x?%281%29%202>"));
        assert!(grid.contains("### 1. ☆ 속보\\] \\[클릭\\]"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(1, 1000).chars().count(), 1);
    }
}
