//! JSON export of aggregated editions.
//!
//! # Output Structure
//!
//! Files are organized by date, one per category and source:
//! ```text
//! json_output_dir/
//! └── 2025-12-16/
//!     ├── politics_donga.json
//!     ├── politics_chosun.json
//!     └── sports_donga.json
//! ```
//!
//! Re-exporting the same category and source overwrites the previous file.

use crate::models::Edition;
use crate::utils::ensure_writable_dir;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write an [`Edition`] under `json_output_dir`.
///
/// Creates the date directory if needed and returns the written path:
/// `{json_output_dir}/{date}/{category}_{source}.json`.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, category = %edition.category, source = %edition.source))]
pub async fn write_edition(
    edition: &Edition,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(edition)?;

    let full_json_dir = format!("{}/{}", json_output_dir.trim_end_matches('/'), edition.date);
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = ensure_writable_dir(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to prepare JSON dir");
        return Err(e);
    }

    let output_json_filename = PathBuf::from(&full_json_dir)
        .join(format!("{}_{}.json", edition.category, edition.source));
    fs::write(&output_json_filename, json).await?;
    info!(
        path = %output_json_filename.display(),
        articles = edition.articles.len(),
        "Wrote edition JSON"
    );

    Ok(output_json_filename)
}
