//! Base style selection and its coupling to the theme mode.

use eventmap_core::config::{MapConfig, ThemeMode};
use eventmap_core::engine::MapContext;
use serde::Serialize;
use tracing::{debug, info, warn};

/// A selectable base map style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleOption {
    pub id: String,
    pub label: &'static str,
    pub url: String,
    pub icon: &'static str,
}

/// Tracks the active base style.
///
/// Only configured URLs become options, numbered `style-0..n` in the order
/// Default, Alt 1, Alt 2, Terrain, Satellite. The Alt 2 URL is the dark
/// style; every other style implies light mode. The light style is the one
/// mounted first.
#[derive(Debug, Clone, Default)]
pub struct StyleSelector {
    options: Vec<StyleOption>,
    light_url: Option<String>,
    dark_url: Option<String>,
    active: Option<String>,
}

impl StyleSelector {
    pub fn from_config(config: &MapConfig) -> Self {
        let styles = &config.styles;
        let candidates = [
            ("Default", &styles.default, "map"),
            ("Alt 1", &styles.alt1, "sun"),
            ("Alt 2", &styles.alt2, "moon"),
            ("Terrain", &styles.terrain, "trees"),
            ("Satellite", &styles.satellite, "satellite"),
        ];

        let options: Vec<StyleOption> = candidates
            .into_iter()
            .filter_map(|(label, url, icon)| url.as_ref().map(|url| (label, url, icon)))
            .enumerate()
            .map(|(i, (label, url, icon))| StyleOption {
                id: format!("style-{}", i),
                label,
                url: url.clone(),
                icon,
            })
            .collect();

        let active = options.first().map(|o| o.id.clone());
        debug!(options = options.len(), "Style selector built");

        Self {
            options,
            light_url: Some(config.initial_style_url().to_string()),
            dark_url: styles.alt2.clone(),
            active,
        }
    }

    pub fn options(&self) -> &[StyleOption] {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn active(&self) -> Option<&StyleOption> {
        let active = self.active.as_deref()?;
        self.options.iter().find(|o| o.id == active)
    }

    /// Switches the map to the style `id` and returns the theme mode it
    /// implies. No-op before the map is ready or for unknown ids.
    pub fn select(&mut self, ctx: &MapContext, id: &str) -> Option<ThemeMode> {
        let option = self.options.iter().find(|o| o.id == id)?.clone();
        if !self.load(ctx, &option) {
            return None;
        }
        Some(self.mode_for(&option.url))
    }

    /// Follows an external theme change: moves to the dark style in dark mode
    /// and to the default style in light mode, unless already there. Falls
    /// back to the first option when the target URL is not offered. Returns
    /// the id of the newly active option.
    pub fn sync_to_theme(&mut self, ctx: &MapContext, mode: ThemeMode) -> Option<String> {
        let target = match mode {
            ThemeMode::Dark => self.dark_url.as_deref(),
            ThemeMode::Light => self.light_url.as_deref(),
        }?;

        if self.active().map(|o| o.url.as_str()) == Some(target) {
            return None;
        }

        let option = self
            .options
            .iter()
            .find(|o| o.url == target)
            .or_else(|| self.options.first())?
            .clone();
        self.load(ctx, &option).then_some(option.id)
    }

    fn mode_for(&self, url: &str) -> ThemeMode {
        if self.dark_url.as_deref() == Some(url) {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    fn load(&mut self, ctx: &MapContext, option: &StyleOption) -> bool {
        match ctx.with(|engine| engine.set_style(&option.url)) {
            Some(Ok(())) => {
                info!(id = %option.id, url = %option.url, "Style selected");
                self.active = Some(option.id.clone());
                true
            }
            Some(Err(e)) => {
                warn!(id = %option.id, error = %e, "Style change failed");
                false
            }
            None => false,
        }
    }
}
