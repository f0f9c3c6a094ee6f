//! # EventMap Viewport
//!
//! Marker overlays, selection state and camera coordination for the event
//! map.
//!
//! - [`camera`]: focus/unfocus transitions around the side panel
//! - [`selection`]: hovered/selected events, panel width and close gestures
//! - [`markers`]: keyed marker layers and pointer dispatch
//! - [`overlay`]: the event overlay tying the above together
//! - [`view`]: tooltip and panel display models

pub mod camera;
pub mod markers;
pub mod overlay;
pub mod selection;
pub mod view;

pub use camera::{CameraCoordinator, FocusOutcome};
pub use markers::{MarkerAction, MarkerItem, MarkerLayer, MarkerStyle};
pub use overlay::EventOverlay;
pub use selection::{panel_width_for, CloseTrigger, PanelSide, SelectionState, SwipeTracker};
pub use view::{PanelView, TooltipView};
