//! Light/dark theme preference stored under the `theme` key.

use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Key holding the theme preference.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// Read the stored theme. Missing or unrecognized values give the default.
pub fn load_theme(store: &impl KeyValueStore) -> Result<Theme, StoreError> {
    let theme = match store.get(THEME_KEY)? {
        Some(raw) => raw.parse().unwrap_or_else(|e: String| {
            warn!(value = %raw, error = %e, "Ignoring stored theme");
            Theme::default()
        }),
        None => Theme::default(),
    };
    Ok(theme)
}

pub fn save_theme(store: &mut impl KeyValueStore, theme: Theme) -> Result<(), StoreError> {
    store.set(THEME_KEY, theme.as_str().to_string())?;
    info!(%theme, "Saved theme preference");
    Ok(())
}
