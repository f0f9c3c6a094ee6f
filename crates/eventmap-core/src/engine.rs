//! Map engine contract and the shared map context handle.
//!
//! The engine draws the map and owns the style and the camera. Everything
//! else talks to it through [`MapContext`], which is empty until the map is
//! mounted and empty again after teardown.

use crate::config::MapConfig;
use crate::error::{ConfigError, EngineError};
use crate::style::{PaintValue, StyleLayer};
use crate::types::{GeoPoint, Padding, ScreenPoint, ScreenSize};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Identifier of an overlay marker placed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// Which point of the marker element sits on its coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerAnchor {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

/// A positioned overlay element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub position: GeoPoint,
    pub anchor: MarkerAnchor,
    pub offset: ScreenPoint,
    /// Text shown by renderers that cannot draw the element itself
    pub label: String,
}

/// Pointer interaction on a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Enter,
    Leave,
    Click,
}

/// Signals emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    /// First style finished loading
    Load,
    /// Style data changed (including reloads after `set_style`)
    StyleData,
    /// Pointer interaction on a marker overlay
    Marker { marker: MarkerId, pointer: PointerKind },
}

/// Parameters of an eased camera transition. `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EaseOptions {
    pub center: Option<GeoPoint>,
    pub zoom: Option<f64>,
    pub padding: Option<Padding>,
    pub offset: Option<ScreenPoint>,
    pub duration: Duration,
}

/// Parameters of a fly-to transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyToOptions {
    pub center: GeoPoint,
    pub zoom: f64,
    pub speed: f64,
    pub duration: Duration,
    pub essential: bool,
}

/// Everything an engine needs at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    pub access_token: String,
    pub style_url: String,
    pub center: GeoPoint,
    pub zoom: f64,
    pub projection: String,
}

impl MapOptions {
    /// Builds creation options from configuration.
    ///
    /// # Errors
    ///
    /// Fails when the access token is missing; the map must then stay
    /// unmounted.
    pub fn from_config(config: &MapConfig) -> Result<Self, ConfigError> {
        let access_token = config.require_access_token()?.to_string();
        Ok(Self {
            access_token,
            style_url: config.initial_style_url().to_string(),
            center: config.initial_view.center(),
            zoom: config.initial_view.zoom,
            projection: config.projection.clone(),
        })
    }
}

/// The subset of a map engine the rest of the crate depends on.
pub trait MapEngine: Send {
    /// Starts loading a new style. The engine reports completion with
    /// [`MapEvent::StyleData`].
    fn set_style(&mut self, url: &str) -> Result<(), EngineError>;

    /// Starts an eased camera transition, interrupting any running one.
    fn ease_to(&mut self, options: EaseOptions);

    /// Starts a fly-to camera transition.
    fn fly_to(&mut self, options: FlyToOptions);

    /// Projects a geographic point to screen pixels for the current camera.
    fn project(&self, point: GeoPoint) -> ScreenPoint;

    fn zoom(&self) -> f64;

    fn viewport_size(&self) -> ScreenSize;

    fn is_style_loaded(&self) -> bool;

    /// Snapshot of the current style's layers, in draw order.
    fn style_layers(&self) -> Vec<StyleLayer>;

    fn has_layer(&self, layer_id: &str) -> bool;

    fn set_paint_property(
        &mut self,
        layer_id: &str,
        property: &str,
        value: PaintValue,
    ) -> Result<(), EngineError>;

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId;

    /// Removes a marker and its listeners. Unknown ids are ignored.
    fn remove_marker(&mut self, marker: MarkerId);

    /// Takes the signals emitted since the last call.
    fn drain_events(&mut self) -> Vec<MapEvent>;

    /// Releases all engine resources.
    fn remove(&mut self);
}

/// Shared, nullable handle to the mounted map engine.
///
/// Lifecycle: created empty, [`attach`](Self::attach)ed on mount,
/// [`detach`](Self::detach)ed on unmount. All operations through
/// [`with`](Self::with) return `None` while no engine is attached.
#[derive(Clone, Default)]
pub struct MapContext {
    inner: Arc<Mutex<Option<Box<dyn MapEngine>>>>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts an engine, tearing down any previous one.
    pub fn attach(&self, engine: Box<dyn MapEngine>) {
        let mut slot = self.inner.lock();
        if let Some(mut previous) = slot.replace(engine) {
            debug!("Replacing mounted map engine");
            previous.remove();
        }
        info!("Map engine attached");
    }

    /// Unmounts the engine, releasing its resources.
    pub fn detach(&self) -> bool {
        match self.inner.lock().take() {
            Some(mut engine) => {
                engine.remove();
                info!("Map engine detached");
                true
            }
            None => false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Runs `f` against the engine, or returns `None` before the map is ready.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn MapEngine) -> R) -> Option<R> {
        let mut slot = self.inner.lock();
        slot.as_mut().map(|engine| f(engine.as_mut()))
    }

    /// Like [`with`](Self::with) but maps the missing engine to
    /// [`EngineError::NotReady`].
    pub fn try_with<R>(
        &self,
        f: impl FnOnce(&mut dyn MapEngine) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        self.with(f).unwrap_or(Err(EngineError::NotReady))
    }
}

impl fmt::Debug for MapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapContext")
            .field("ready", &self.is_ready())
            .finish()
    }
}
