//! Selection state, panel geometry and close gestures.

use eventmap_core::types::EventLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Viewport edge the detail panel slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelSide {
    Left,
    #[default]
    Right,
}

impl fmt::Display for PanelSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelSide::Left => f.write_str("left"),
            PanelSide::Right => f.write_str("right"),
        }
    }
}

/// Default panel width on wide screens.
pub const DEFAULT_PANEL_WIDTH: f64 = 400.0;

/// Panel width for a window width, in pixels.
pub fn panel_width_for(window_width: f64) -> f64 {
    if window_width < 380.0 {
        (window_width - 32.0).max(260.0)
    } else if window_width < 640.0 {
        320.0
    } else if window_width < 768.0 {
        360.0
    } else {
        DEFAULT_PANEL_WIDTH
    }
}

/// Hovered and selected events plus the panel geometry.
///
/// Hover and selection are independent: both can be live at once and need
/// not refer to the same event. At most one event is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    hovered: Option<EventLocation>,
    selected: Option<EventLocation>,
    panel_side: PanelSide,
    panel_width: f64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            hovered: None,
            selected: None,
            panel_side: PanelSide::default(),
            panel_width: DEFAULT_PANEL_WIDTH,
        }
    }
}

impl SelectionState {
    pub fn new(window_width: f64) -> Self {
        Self {
            panel_width: panel_width_for(window_width),
            ..Self::default()
        }
    }

    pub fn hovered(&self) -> Option<&EventLocation> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&EventLocation> {
        self.selected.as_ref()
    }

    pub fn panel_side(&self) -> PanelSide {
        self.panel_side
    }

    pub fn panel_width(&self) -> f64 {
        self.panel_width
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn set_hovered(&mut self, event: Option<EventLocation>) {
        self.hovered = event;
    }

    /// Selects `event`, replacing any current selection without closing.
    pub fn select(&mut self, event: EventLocation, side: PanelSide) {
        self.panel_side = side;
        self.selected = Some(event);
    }

    /// Clears the selection. Returns true if something was selected.
    pub fn clear_selected(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Recomputes the panel width after a window resize.
    pub fn resize(&mut self, window_width: f64) -> f64 {
        self.panel_width = panel_width_for(window_width);
        self.panel_width
    }
}

/// Ways the panel can be dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseTrigger {
    Button,
    Escape,
    Swipe,
}

impl CloseTrigger {
    /// Maps a keyboard key name to a close trigger.
    pub fn from_key(key: &str) -> Option<Self> {
        (key == "Escape").then_some(CloseTrigger::Escape)
    }
}

/// Horizontal travel, in pixels, a swipe needs to close the panel.
pub const SWIPE_THRESHOLD: f64 = 50.0;

/// Tracks a single touch gesture on the panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwipeTracker {
    start_x: Option<f64>,
}

impl SwipeTracker {
    pub fn start(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Ends the gesture. Returns true when it was an outward swipe toward
    /// the panel's own edge. An end without a start is ignored.
    pub fn end(&mut self, x: f64, side: PanelSide) -> bool {
        let Some(start) = self.start_x.take() else {
            return false;
        };
        let delta = x - start;
        match side {
            PanelSide::Right => delta > SWIPE_THRESHOLD,
            PanelSide::Left => delta < -SWIPE_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventmap_core::events::EventCatalog;

    fn event(id: &str) -> EventLocation {
        let json = format!(
            r#"[{{"id":"{id}","name":"Meetup","city":"Lisbon","country":"Portugal",
                "date":"2025-03-15","type":"upcoming","description":"",
                "longitude":-9.14,"latitude":38.72}}]"#
        );
        let catalog = EventCatalog::from_json_str(&json).unwrap();
        catalog.event_location_by_id(id).unwrap()
    }

    #[test]
    fn test_panel_width_breakpoints() {
        assert_eq!(panel_width_for(320.0), 288.0);
        assert_eq!(panel_width_for(280.0), 260.0);
        assert_eq!(panel_width_for(379.0), 347.0);
        assert_eq!(panel_width_for(380.0), 320.0);
        assert_eq!(panel_width_for(639.0), 320.0);
        assert_eq!(panel_width_for(640.0), 360.0);
        assert_eq!(panel_width_for(767.0), 360.0);
        assert_eq!(panel_width_for(768.0), 400.0);
        assert_eq!(panel_width_for(1920.0), 400.0);
    }

    #[test]
    fn test_select_replaces_without_closing() {
        let mut state = SelectionState::new(1280.0);
        assert!(!state.is_open());

        state.select(event("a"), PanelSide::Right);
        state.select(event("b"), PanelSide::Left);
        assert!(state.is_open());
        assert_eq!(state.selected().map(|e| e.id()), Some("b"));
        assert_eq!(state.panel_side(), PanelSide::Left);

        assert!(state.clear_selected());
        assert!(!state.clear_selected());
    }

    #[test]
    fn test_hover_independent_of_selection() {
        let mut state = SelectionState::default();
        state.select(event("a"), PanelSide::Right);
        state.set_hovered(Some(event("b")));
        assert_eq!(state.hovered().map(|e| e.id()), Some("b"));
        assert_eq!(state.selected().map(|e| e.id()), Some("a"));

        state.set_hovered(None);
        assert!(state.is_open());
    }

    #[test]
    fn test_resize_recomputes_width() {
        let mut state = SelectionState::new(1280.0);
        assert_eq!(state.panel_width(), 400.0);
        assert_eq!(state.resize(600.0), 320.0);
        assert_eq!(state.panel_width(), 320.0);
    }

    #[test]
    fn test_swipe_outward_closes() {
        let mut swipe = SwipeTracker::default();
        swipe.start(100.0);
        assert!(swipe.end(151.0, PanelSide::Right));

        swipe.start(100.0);
        assert!(!swipe.end(150.0, PanelSide::Right));

        swipe.start(200.0);
        assert!(swipe.end(120.0, PanelSide::Left));

        // inward swipe on a left panel
        swipe.start(100.0);
        assert!(!swipe.end(200.0, PanelSide::Left));

        assert!(!swipe.end(0.0, PanelSide::Left));
    }

    #[test]
    fn test_escape_key() {
        assert_eq!(CloseTrigger::from_key("Escape"), Some(CloseTrigger::Escape));
        assert_eq!(CloseTrigger::from_key("Enter"), None);
    }
}
