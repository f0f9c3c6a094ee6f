//! Theme tokens and the map palette.
//!
//! The palette is a snapshot of named color tokens from the active visual
//! theme. Missing tokens fall back to fixed defaults, so resolution never
//! fails.

use eventmap_core::config::{ThemeConfig, ThemeMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source of named color tokens for the active theme.
pub trait ThemeTokens {
    /// Returns the trimmed token value, or `None` when unset or blank.
    fn token(&self, name: &str) -> Option<String>;
}

/// Token maps for both theme modes plus the mode currently applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSheet {
    mode: ThemeMode,
    light: BTreeMap<String, String>,
    dark: BTreeMap<String, String>,
}

impl TokenSheet {
    pub fn new(
        mode: ThemeMode,
        light: BTreeMap<String, String>,
        dark: BTreeMap<String, String>,
    ) -> Self {
        Self { mode, light, dark }
    }

    pub fn from_config(config: &ThemeConfig) -> Self {
        Self::new(config.mode, config.light.clone(), config.dark.clone())
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Commits a new mode. Returns true if it changed.
    pub fn set_mode(&mut self, mode: ThemeMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    /// Overrides one token of a mode.
    pub fn set_token(&mut self, mode: ThemeMode, name: impl Into<String>, value: impl Into<String>) {
        let tokens = match mode {
            ThemeMode::Light => &mut self.light,
            ThemeMode::Dark => &mut self.dark,
        };
        tokens.insert(name.into(), value.into());
    }

    fn active(&self) -> &BTreeMap<String, String> {
        match self.mode {
            ThemeMode::Light => &self.light,
            ThemeMode::Dark => &self.dark,
        }
    }
}

impl ThemeTokens for TokenSheet {
    fn token(&self, name: &str) -> Option<String> {
        self.active()
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Semantic colors applied to the map style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub background: String,
    pub foreground: String,
    pub primary: String,
    pub secondary: String,
    pub muted: String,
    pub accent: String,
    pub border: String,
    pub card: String,
    pub water: String,
    pub park: String,
    pub park_strong: String,
    pub road: String,
    pub road_secondary: String,
    pub label: String,
}

// (token, fallback) per palette slot
const BACKGROUND: (&str, &str) = ("background", "#FCEBDE");
const FOREGROUND: (&str, &str) = ("foreground", "#130401");
const PRIMARY: (&str, &str) = ("primary", "#B67237");
const SECONDARY: (&str, &str) = ("secondary", "#DE9E67");
const MUTED: (&str, &str) = ("muted", "#F5E3D6");
const ACCENT: (&str, &str) = ("accent", "#DE9E67");
const BORDER: (&str, &str) = ("border", "#E8CBB3");
const CARD: (&str, &str) = ("card", "#FFFFFF");
const WATER: (&str, &str) = ("chart-1", "#1EB6F8");
const PARK: (&str, &str) = ("chart-3", "#F0E89D");
const PARK_STRONG: (&str, &str) = ("chart-4", "#B9AD3E");

impl Default for Palette {
    fn default() -> Self {
        resolve_palette(&NoTokens)
    }
}

struct NoTokens;

impl ThemeTokens for NoTokens {
    fn token(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Reads the palette from the active theme tokens.
///
/// Roads reuse the primary/secondary tokens and labels the foreground token.
pub fn resolve_palette(tokens: &dyn ThemeTokens) -> Palette {
    let read = |(name, fallback): (&str, &str)| {
        tokens.token(name).unwrap_or_else(|| fallback.to_string())
    };

    Palette {
        background: read(BACKGROUND),
        foreground: read(FOREGROUND),
        primary: read(PRIMARY),
        secondary: read(SECONDARY),
        muted: read(MUTED),
        accent: read(ACCENT),
        border: read(BORDER),
        card: read(CARD),
        water: read(WATER),
        park: read(PARK),
        park_strong: read(PARK_STRONG),
        road: read(PRIMARY),
        road_secondary: read(SECONDARY),
        label: read(FOREGROUND),
    }
}
