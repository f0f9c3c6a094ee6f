//! # EventMap
//!
//! An interactive event map: event markers with a detail panel, a
//! theme-aware base map, and place search, all driven through one shared
//! [`MapContext`].
//!
//! [`MapApp`] wires the pieces together. The host mounts an engine, feeds
//! user input to the app, and calls [`MapApp::pump`] to route engine
//! signals (style loads, marker pointer events) to their handlers.

use eventmap_core::config::{AppConfig, ThemeMode};
use eventmap_core::engine::{MapContext, MapEngine, MapOptions};
use eventmap_core::error::ConfigError;
use eventmap_core::events::EventCatalog;
use eventmap_core::types::GeoPoint;
use eventmap_search::{Geocoder, LocationFeature, SearchPipeline, SearchState};
use eventmap_style::{StyleSelector, ThemeController};
use eventmap_viewport::{EventOverlay, MarkerAction, MarkerItem, MarkerLayer, MarkerStyle};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// A search result pinned on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPin(pub LocationFeature);

impl MarkerItem for LocationPin {
    fn key(&self) -> &str {
        self.0.id()
    }

    fn position(&self) -> GeoPoint {
        self.0.position()
    }

    fn label(&self) -> String {
        self.0.name().to_string()
    }
}

/// The assembled map application.
pub struct MapApp {
    config: AppConfig,
    ctx: MapContext,
    theme: ThemeController,
    styles: Mutex<StyleSelector>,
    overlay: Mutex<EventOverlay>,
    search: SearchPipeline,
    location_pins: Mutex<MarkerLayer<LocationPin>>,
}

impl MapApp {
    pub fn new(config: AppConfig, catalog: &EventCatalog, geocoder: Arc<dyn Geocoder>) -> Self {
        let window_width = config.map.viewport.width;
        Self {
            ctx: MapContext::new(),
            theme: ThemeController::from_config(&config.theme),
            styles: Mutex::new(StyleSelector::from_config(&config.map)),
            overlay: Mutex::new(EventOverlay::new(catalog, window_width)),
            search: SearchPipeline::from_config(geocoder, &config.search),
            location_pins: Mutex::new(MarkerLayer::new(MarkerStyle::LOCATION)),
            config,
        }
    }

    pub fn context(&self) -> &MapContext {
        &self.ctx
    }

    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    pub fn search(&self) -> &SearchPipeline {
        &self.search
    }

    /// Creates the engine through `create` and places the event markers.
    ///
    /// # Errors
    ///
    /// Fails when the access token is missing. Search and the event list
    /// stay usable; everything map-bound becomes a no-op.
    pub fn mount<F>(&self, create: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&MapOptions) -> Box<dyn MapEngine>,
    {
        self.theme.mount(&self.ctx, &self.config.map, create)?;
        self.overlay.lock().mount(&self.ctx);
        Ok(())
    }

    /// Removes markers and releases the engine.
    pub fn unmount(&self) {
        self.overlay.lock().teardown(&self.ctx);
        self.location_pins.lock().clear(&self.ctx);
        self.theme.unmount(&self.ctx);
    }

    /// Routes pending engine signals. Returns how many were handled.
    pub fn pump(&self) -> usize {
        let events = self.ctx.with(|engine| engine.drain_events()).unwrap_or_default();
        for event in &events {
            self.theme.handle_event(&self.ctx, event);
            if self.overlay.lock().handle_map_event(&self.ctx, event) {
                continue;
            }
            let action = self.location_pins.lock().dispatch(event);
            if let Some(MarkerAction::Hover(Some(pin)) | MarkerAction::Click(pin)) = action {
                self.search.set_active_location(Some(pin.0));
            }
        }
        if !events.is_empty() {
            debug!(events = events.len(), "Map events dispatched");
        }
        events.len()
    }

    /// Runs `f` against the event overlay.
    pub fn with_overlay<R>(&self, f: impl FnOnce(&mut EventOverlay, &MapContext) -> R) -> R {
        let mut overlay = self.overlay.lock();
        f(&mut *overlay, &self.ctx)
    }

    /// Switches the base style from the style tabs. A style that implies a
    /// different theme mode switches the mode too, without re-syncing the
    /// style from the new mode.
    pub fn select_style(&self, id: &str) -> Option<ThemeMode> {
        let mode = self.styles.lock().select(&self.ctx, id)?;
        if mode != self.theme.mode() {
            info!(?mode, style = id, "Style implies theme change");
            self.theme.set_mode(&self.ctx, mode);
        }
        Some(mode)
    }

    /// Applies an external theme change and follows it with the base style.
    pub fn set_theme_mode(&self, mode: ThemeMode) {
        self.theme.set_mode(&self.ctx, mode);
        if let Some(id) = self.styles.lock().sync_to_theme(&self.ctx, mode) {
            debug!(style = %id, "Style synced to theme");
        }
    }

    pub fn active_style(&self) -> Option<String> {
        self.styles.lock().active().map(|o| o.id.clone())
    }

    pub fn on_query_change(&self, text: &str) {
        self.search.on_query_change(text);
    }

    /// Picks the search result at `index` and pins it on the map.
    pub fn select_search_result(&self, index: usize) -> bool {
        let selected = self.search.select_index(&self.ctx, index);
        if selected {
            self.sync_location_pins();
        }
        selected
    }

    pub fn clear_search(&self) {
        self.search.clear();
        self.sync_location_pins();
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    fn sync_location_pins(&self) {
        let pins: Vec<LocationPin> = self
            .search
            .state()
            .selected_locations
            .into_iter()
            .map(LocationPin)
            .collect();
        self.location_pins.lock().sync(&self.ctx, &pins);
    }
}
