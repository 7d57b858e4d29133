//! Output generation: Markdown views and JSON edition snapshots.
//!
//! # Submodules
//!
//! - [`markdown`]: Renders a [`crate::views::View`] as Markdown text
//! - [`json`]: Writes an [`crate::models::Edition`] to disk
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-12-16/
//!     ├── politics_donga.json
//!     └── sports_chosun.json
//! ```
//!
//! Markdown is written to stdout by the binary.

pub mod json;
pub mod markdown;
