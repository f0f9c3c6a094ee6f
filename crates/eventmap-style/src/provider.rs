//! Map mounting and theme lifecycle.
//!
//! [`ThemeController`] creates the engine, attaches it to the shared
//! [`MapContext`], and keeps the style recolored across style reloads and
//! theme-mode changes.

use crate::palette::{resolve_palette, Palette, TokenSheet};
use crate::theme::{apply_theme, ThemeReport};
use eventmap_core::config::{MapConfig, ThemeConfig, ThemeMode};
use eventmap_core::engine::{MapContext, MapEngine, MapEvent, MapOptions};
use eventmap_core::error::ConfigError;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Owns the active theme tokens and re-applies them to the mounted map.
#[derive(Debug, Clone, Default)]
pub struct ThemeController {
    tokens: Arc<RwLock<TokenSheet>>,
    /// Set by the first `Load` of the mounted engine
    loaded: Arc<AtomicBool>,
}

impl ThemeController {
    pub fn new(tokens: TokenSheet) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(tokens)),
            loaded: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_config(config: &ThemeConfig) -> Self {
        Self::new(TokenSheet::from_config(config))
    }

    /// Creates the map engine and attaches it to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the access token is missing. The
    /// context then stays empty and every map-dependent feature is inert.
    pub fn mount<F>(&self, ctx: &MapContext, config: &MapConfig, create: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&MapOptions) -> Box<dyn MapEngine>,
    {
        let options = MapOptions::from_config(config).inspect_err(|e| {
            error!(error = %e, "Map access token is missing, map not mounted");
        })?;

        let engine = create(&options);
        self.loaded.store(false, Ordering::Release);
        ctx.attach(engine);
        info!(
            style = %options.style_url,
            zoom = options.zoom,
            projection = %options.projection,
            "Map mounted"
        );
        Ok(())
    }

    /// Tears the map down.
    pub fn unmount(&self, ctx: &MapContext) -> bool {
        self.loaded.store(false, Ordering::Release);
        ctx.detach()
    }

    /// Whether the mounted map has finished its first load. Hosts show a
    /// loading state until then.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Reacts to an engine signal. Both the first load and every later style
    /// reload trigger a full theme pass.
    pub fn handle_event(&self, ctx: &MapContext, event: &MapEvent) -> Option<ThemeReport> {
        match event {
            MapEvent::Load => {
                self.loaded.store(true, Ordering::Release);
                debug!("Map loaded");
                self.apply(ctx)
            }
            MapEvent::StyleData => self.apply(ctx),
            MapEvent::Marker { .. } => None,
        }
    }

    /// Runs a theme pass with the current palette. `None` before mount.
    pub fn apply(&self, ctx: &MapContext) -> Option<ThemeReport> {
        let palette = self.palette();
        ctx.with(|engine| apply_theme(engine, &palette))
    }

    /// Commits a new theme mode, then re-applies if the style is loaded.
    pub fn set_mode(&self, ctx: &MapContext, mode: ThemeMode) -> Option<ThemeReport> {
        let changed = self.tokens.write().set_mode(mode);
        if changed {
            info!(?mode, "Theme mode changed");
        }

        if ctx.with(|engine| engine.is_style_loaded()) != Some(true) {
            return None;
        }
        self.apply(ctx)
    }

    pub fn mode(&self) -> ThemeMode {
        self.tokens.read().mode()
    }

    /// Current palette snapshot.
    pub fn palette(&self) -> Palette {
        resolve_palette(&*self.tokens.read())
    }

    /// Overrides a token of one mode. Takes effect on the next pass.
    pub fn set_token(&self, mode: ThemeMode, name: &str, value: &str) {
        self.tokens.write().set_token(mode, name, value);
    }
}
