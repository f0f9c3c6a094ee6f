//! The event overlay: markers, hover tooltip, detail panel and camera.
//!
//! `EventOverlay` keeps the selection, the panel geometry and the camera
//! consistent. Every close trigger (button, Escape, swipe) goes through
//! [`EventOverlay::close_panel`], which clears the selection and unfocuses
//! the camera.

use crate::camera::{CameraCoordinator, FocusOutcome};
use crate::markers::{MarkerAction, MarkerLayer, MarkerStyle};
use crate::selection::{CloseTrigger, SelectionState, SwipeTracker};
use crate::view::{PanelView, TooltipView};
use eventmap_core::engine::{MapContext, MapEvent};
use eventmap_core::events::EventCatalog;
use eventmap_core::types::EventLocation;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EventOverlay {
    events: Vec<EventLocation>,
    markers: MarkerLayer<EventLocation>,
    selection: SelectionState,
    camera: CameraCoordinator,
    swipe: SwipeTracker,
}

impl EventOverlay {
    pub fn new(catalog: &EventCatalog, window_width: f64) -> Self {
        Self::with_events(catalog.list_event_locations(), window_width)
    }

    pub fn with_events(events: Vec<EventLocation>, window_width: f64) -> Self {
        Self {
            events,
            markers: MarkerLayer::new(MarkerStyle::EVENT),
            selection: SelectionState::new(window_width),
            camera: CameraCoordinator::default(),
            swipe: SwipeTracker::default(),
        }
    }

    pub fn events(&self) -> &[EventLocation] {
        &self.events
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn markers(&self) -> &MarkerLayer<EventLocation> {
        &self.markers
    }

    /// Places one marker per event. Call once the map is mounted.
    pub fn mount(&mut self, ctx: &MapContext) {
        self.markers.sync(ctx, &self.events);
    }

    /// Replaces the event list, keeping markers keyed by event id. A hovered
    /// event that is no longer listed loses its tooltip.
    pub fn set_events(&mut self, ctx: &MapContext, events: Vec<EventLocation>) {
        self.events = events;
        self.markers.sync(ctx, &self.events);

        let stale = self
            .selection
            .hovered()
            .is_some_and(|h| !self.events.iter().any(|e| e.id() == h.id()));
        if stale {
            self.selection.set_hovered(None);
        }
        debug!(events = self.events.len(), "Event markers resynced");
    }

    /// Removes all markers.
    pub fn teardown(&mut self, ctx: &MapContext) {
        self.markers.clear(ctx);
        self.selection.set_hovered(None);
    }

    /// Routes a marker signal to hover or selection. Returns true if the
    /// signal belonged to one of the event markers.
    pub fn handle_map_event(&mut self, ctx: &MapContext, event: &MapEvent) -> bool {
        match self.markers.dispatch(event) {
            Some(MarkerAction::Hover(hovered)) => {
                self.selection.set_hovered(hovered);
                true
            }
            Some(MarkerAction::Click(clicked)) => {
                self.open_panel_for_event(ctx, clicked);
                true
            }
            None => false,
        }
    }

    /// Selects `event`, opens the panel on the side away from it and focuses
    /// the camera. Does nothing before the map is ready. Selecting while the
    /// panel is open replaces the event in place.
    pub fn open_panel_for_event(
        &mut self,
        ctx: &MapContext,
        event: EventLocation,
    ) -> Option<FocusOutcome> {
        let outcome = self
            .camera
            .focus_on(ctx, event.point(), self.selection.panel_width())?;
        info!(event = event.id(), side = %outcome.panel_side, "Event panel opened");
        self.selection.select(event, outcome.panel_side);
        Some(outcome)
    }

    /// Opens the panel for the event with `id`.
    pub fn open_panel_for_id(&mut self, ctx: &MapContext, id: &str) -> Option<FocusOutcome> {
        let event = self.events.iter().find(|e| e.id() == id)?.clone();
        self.open_panel_for_event(ctx, event)
    }

    /// Clears the selection and unfocuses the camera. Returns true if a
    /// panel was open.
    pub fn close_panel(&mut self, ctx: &MapContext, trigger: CloseTrigger) -> bool {
        let was_open = self.selection.clear_selected();
        self.camera.unfocus(ctx);
        if was_open {
            info!(?trigger, "Event panel closed");
        }
        was_open
    }

    pub fn on_key(&mut self, ctx: &MapContext, key: &str) -> bool {
        match CloseTrigger::from_key(key) {
            Some(trigger) => self.close_panel(ctx, trigger),
            None => false,
        }
    }

    pub fn on_resize(&mut self, window_width: f64) {
        let width = self.selection.resize(window_width);
        debug!(window_width, panel_width = width, "Panel width recomputed");
    }

    pub fn on_touch_start(&mut self, x: f64) {
        self.swipe.start(x);
    }

    pub fn on_touch_end(&mut self, ctx: &MapContext, x: f64) -> bool {
        if self.swipe.end(x, self.selection.panel_side()) {
            self.close_panel(ctx, CloseTrigger::Swipe)
        } else {
            false
        }
    }

    pub fn tooltip(&self) -> Option<TooltipView> {
        self.selection.hovered().map(TooltipView::for_event)
    }

    pub fn panel(&self) -> PanelView {
        PanelView::new(
            self.selection.selected(),
            self.selection.panel_side(),
            self.selection.panel_width(),
        )
    }
}
