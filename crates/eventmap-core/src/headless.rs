//! In-memory map engine.
//!
//! `HeadlessMap` keeps the camera, style and markers in memory and applies
//! camera transitions instantly. It backs the command-line tools and every
//! test that needs an engine. Clones share state, so a test can keep one
//! clone for inspection after handing another to a [`MapContext`].
//!
//! [`MapContext`]: crate::engine::MapContext

use crate::engine::{
    EaseOptions, FlyToOptions, MapEngine, MapEvent, MarkerId, MarkerSpec, PointerKind,
};
use crate::error::EngineError;
use crate::style::{PaintValue, StyleDocument, StyleLayer};
use crate::types::{GeoPoint, ScreenPoint, ScreenSize, ViewportState};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Tile size used by vector map engines.
const TILE_SIZE: f64 = 512.0;

/// Web Mercator latitude limit.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// URL under which [`HeadlessMap::load_document`] registers its style.
pub const INLINE_STYLE_URL: &str = "inline://style";

#[derive(Debug)]
struct HeadlessState {
    size: ScreenSize,
    viewport: ViewportState,
    styles: HashMap<String, StyleDocument>,
    style: StyleDocument,
    style_url: Option<String>,
    pending_style: Option<String>,
    style_loaded: bool,
    loaded_once: bool,
    rejected: HashSet<(String, String)>,
    paint_writes: usize,
    markers: BTreeMap<MarkerId, MarkerSpec>,
    next_marker: u64,
    events: VecDeque<MapEvent>,
    last_ease: Option<EaseOptions>,
    last_fly: Option<FlyToOptions>,
    removed: bool,
}

/// An engine that renders nothing.
#[derive(Debug, Clone)]
pub struct HeadlessMap {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessMap {
    pub fn new(size: ScreenSize) -> Self {
        Self::with_view(size, GeoPoint::ORIGIN, 0.0)
    }

    pub fn with_view(size: ScreenSize, center: GeoPoint, zoom: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                size,
                viewport: ViewportState::new(center, zoom),
                styles: HashMap::new(),
                style: StyleDocument::default(),
                style_url: None,
                pending_style: None,
                style_loaded: false,
                loaded_once: false,
                rejected: HashSet::new(),
                paint_writes: 0,
                markers: BTreeMap::new(),
                next_marker: 1,
                events: VecDeque::new(),
                last_ease: None,
                last_fly: None,
                removed: false,
            })),
        }
    }

    /// Makes a style document available under `url`.
    pub fn register_style(&self, url: impl Into<String>, document: StyleDocument) {
        self.state.lock().styles.insert(url.into(), document);
    }

    /// Registers, selects and finishes loading a document in one step.
    pub fn load_document(&self, document: StyleDocument) {
        self.register_style(INLINE_STYLE_URL, document);
        let mut engine = self.clone();
        if let Err(e) = engine.set_style(INLINE_STYLE_URL) {
            warn!(error = %e, "Inline style load failed");
            return;
        }
        self.complete_style_load();
    }

    /// Finishes the pending style load, emitting `Load` on the first load and
    /// `StyleData` on every load. Returns false when nothing was pending.
    pub fn complete_style_load(&self) -> bool {
        let mut state = self.state.lock();
        let Some(url) = state.pending_style.take() else {
            return false;
        };
        let document = state.styles.get(&url).cloned().unwrap_or_default();
        debug!(url = %url, layers = document.layers.len(), "Style loaded");
        state.style = document;
        state.style_url = Some(url);
        state.style_loaded = true;
        if !state.loaded_once {
            state.loaded_once = true;
            state.events.push_back(MapEvent::Load);
        }
        state.events.push_back(MapEvent::StyleData);
        true
    }

    /// Makes every future write of `property` on `layer_id` fail.
    pub fn reject_property(&self, layer_id: impl Into<String>, property: impl Into<String>) {
        self.state
            .lock()
            .rejected
            .insert((layer_id.into(), property.into()));
    }

    /// Simulates a pointer interaction on a marker. Returns false for
    /// unknown markers.
    pub fn pointer(&self, marker: MarkerId, pointer: PointerKind) -> bool {
        let mut state = self.state.lock();
        if !state.markers.contains_key(&marker) {
            return false;
        }
        state.events.push_back(MapEvent::Marker { marker, pointer });
        true
    }

    pub fn resize(&self, size: ScreenSize) {
        self.state.lock().size = size;
    }

    pub fn viewport(&self) -> ViewportState {
        self.state.lock().viewport
    }

    pub fn style_document(&self) -> StyleDocument {
        self.state.lock().style.clone()
    }

    pub fn style_url(&self) -> Option<String> {
        self.state.lock().style_url.clone()
    }

    pub fn pending_style(&self) -> Option<String> {
        self.state.lock().pending_style.clone()
    }

    pub fn paint_writes(&self) -> usize {
        self.state.lock().paint_writes
    }

    pub fn markers(&self) -> BTreeMap<MarkerId, MarkerSpec> {
        self.state.lock().markers.clone()
    }

    pub fn last_ease(&self) -> Option<EaseOptions> {
        self.state.lock().last_ease.clone()
    }

    pub fn last_fly(&self) -> Option<FlyToOptions> {
        self.state.lock().last_fly.clone()
    }

    pub fn is_removed(&self) -> bool {
        self.state.lock().removed
    }
}

fn mercator_x(longitude: f64, world: f64) -> f64 {
    (longitude + 180.0) / 360.0 * world
}

fn mercator_y(latitude: f64, world: f64) -> f64 {
    let lat = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world
}

impl MapEngine for HeadlessMap {
    fn set_style(&mut self, url: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if !state.styles.contains_key(url) {
            return Err(EngineError::UnknownStyle {
                url: url.to_string(),
            });
        }
        debug!(url, "Style load started");
        state.pending_style = Some(url.to_string());
        state.style_loaded = false;
        Ok(())
    }

    fn ease_to(&mut self, options: EaseOptions) {
        let mut state = self.state.lock();
        let viewport = &mut state.viewport;
        if let Some(center) = options.center {
            viewport.center = center;
        }
        if let Some(zoom) = options.zoom {
            viewport.zoom = zoom.max(0.0);
        }
        if let Some(padding) = options.padding {
            viewport.padding = padding;
        }
        if let Some(offset) = options.offset {
            viewport.pixel_offset = offset;
        }
        trace!(?options, "ease_to");
        state.last_ease = Some(options);
    }

    fn fly_to(&mut self, options: FlyToOptions) {
        let mut state = self.state.lock();
        state.viewport.center = options.center;
        state.viewport.zoom = options.zoom.max(0.0);
        trace!(?options, "fly_to");
        state.last_fly = Some(options);
    }

    fn project(&self, point: GeoPoint) -> ScreenPoint {
        let state = self.state.lock();
        let v = &state.viewport;
        let world = TILE_SIZE * 2f64.powf(v.zoom);

        let inner_w = (state.size.width - v.padding.left - v.padding.right).max(0.0);
        let inner_h = (state.size.height - v.padding.top - v.padding.bottom).max(0.0);
        let cx = v.padding.left + inner_w / 2.0 + v.pixel_offset.x;
        let cy = v.padding.top + inner_h / 2.0 + v.pixel_offset.y;

        ScreenPoint::new(
            mercator_x(point.longitude, world) - mercator_x(v.center.longitude, world) + cx,
            mercator_y(point.latitude, world) - mercator_y(v.center.latitude, world) + cy,
        )
    }

    fn zoom(&self) -> f64 {
        self.state.lock().viewport.zoom
    }

    fn viewport_size(&self) -> ScreenSize {
        self.state.lock().size
    }

    fn is_style_loaded(&self) -> bool {
        self.state.lock().style_loaded
    }

    fn style_layers(&self) -> Vec<StyleLayer> {
        self.state.lock().style.layers.clone()
    }

    fn has_layer(&self, layer_id: &str) -> bool {
        self.state.lock().style.layer(layer_id).is_some()
    }

    fn set_paint_property(
        &mut self,
        layer_id: &str,
        property: &str,
        value: PaintValue,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if state
            .rejected
            .contains(&(layer_id.to_string(), property.to_string()))
        {
            return Err(EngineError::Rejected {
                reason: format!("{} on {} is locked", property, layer_id),
            });
        }
        let layer = state
            .style
            .layers
            .iter_mut()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| EngineError::UnknownLayer {
                layer: layer_id.to_string(),
            })?;
        if !layer.layer_type.accepts(property) {
            return Err(EngineError::unsupported(layer_id, property));
        }
        layer.paint.insert(property.to_string(), value);
        state.paint_writes += 1;
        Ok(())
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
        let mut state = self.state.lock();
        let id = MarkerId(state.next_marker);
        state.next_marker += 1;
        state.markers.insert(id, marker);
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        let mut state = self.state.lock();
        state.markers.remove(&marker);
        // drop queued interactions for the removed overlay
        state.events.retain(|e| match e {
            MapEvent::Marker { marker: m, .. } => *m != marker,
            _ => true,
        });
    }

    fn drain_events(&mut self) -> Vec<MapEvent> {
        self.state.lock().events.drain(..).collect()
    }

    fn remove(&mut self) {
        let mut state = self.state.lock();
        state.markers.clear();
        state.events.clear();
        state.removed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::LayerType;
    use crate::types::Padding;
    use serde_json::json;

    fn size() -> ScreenSize {
        ScreenSize::new(1000.0, 800.0)
    }

    fn doc() -> StyleDocument {
        StyleDocument::from_layers(vec![
            StyleLayer::new("background", LayerType::Background),
            StyleLayer::new("water", LayerType::Fill),
        ])
    }

    #[test]
    fn test_center_projects_to_viewport_center() {
        let map = HeadlessMap::with_view(size(), GeoPoint::new(13.4, 52.5), 5.0);
        let p = map.project(GeoPoint::new(13.4, 52.5));
        assert!((p.x - 500.0).abs() < 1e-6);
        assert!((p.y - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_east_projects_right_north_projects_up() {
        let map = HeadlessMap::with_view(size(), GeoPoint::ORIGIN, 2.0);
        let east = map.project(GeoPoint::new(10.0, 0.0));
        let north = map.project(GeoPoint::new(0.0, 10.0));
        assert!(east.x > 500.0);
        assert!(north.y < 400.0);
    }

    #[test]
    fn test_padding_shifts_projection_center() {
        let mut map = HeadlessMap::with_view(size(), GeoPoint::ORIGIN, 1.0);
        map.ease_to(EaseOptions {
            padding: Some(Padding {
                right: 400.0,
                ..Padding::ZERO
            }),
            ..Default::default()
        });
        let p = map.project(GeoPoint::ORIGIN);
        assert!((p.x - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_style_load_lifecycle() {
        let mut map = HeadlessMap::new(size());
        map.register_style("a", doc());
        assert!(!map.is_style_loaded());
        assert!(matches!(
            map.set_style("missing"),
            Err(EngineError::UnknownStyle { .. })
        ));

        map.set_style("a").unwrap();
        assert!(!map.is_style_loaded());
        assert!(map.complete_style_load());
        assert!(map.is_style_loaded());
        assert_eq!(map.drain_events(), vec![MapEvent::Load, MapEvent::StyleData]);

        map.set_style("a").unwrap();
        map.complete_style_load();
        assert_eq!(map.drain_events(), vec![MapEvent::StyleData]);
        assert!(!map.complete_style_load());
    }

    #[test]
    fn test_load_document_finishes_inline_style() {
        let mut map = HeadlessMap::new(size());
        map.load_document(doc());

        assert!(map.is_style_loaded());
        assert_eq!(map.style_url().as_deref(), Some(INLINE_STYLE_URL));
        assert!(map.pending_style().is_none());
        assert!(map.has_layer("water"));
        assert_eq!(map.drain_events(), vec![MapEvent::Load, MapEvent::StyleData]);
    }

    #[test]
    fn test_paint_validation() {
        let mut map = HeadlessMap::new(size());
        map.load_document(doc());

        assert!(map.set_paint_property("water", "fill-color", json!("#00f")).is_ok());
        assert!(matches!(
            map.set_paint_property("water", "line-color", json!("#00f")),
            Err(EngineError::UnsupportedProperty { .. })
        ));
        assert!(matches!(
            map.set_paint_property("nope", "fill-color", json!("#00f")),
            Err(EngineError::UnknownLayer { .. })
        ));

        map.reject_property("background", "background-color");
        assert!(matches!(
            map.set_paint_property("background", "background-color", json!("#fff")),
            Err(EngineError::Rejected { .. })
        ));
        assert_eq!(map.paint_writes(), 1);
        assert_eq!(
            map.style_document().layer("water").unwrap().paint_value("fill-color"),
            Some(&json!("#00f"))
        );
    }

    #[test]
    fn test_markers_and_pointer_events() {
        let mut map = HeadlessMap::new(size());
        let id = map.add_marker(MarkerSpec {
            position: GeoPoint::ORIGIN,
            anchor: Default::default(),
            offset: ScreenPoint::default(),
            label: "E".to_string(),
        });
        assert!(map.pointer(id, PointerKind::Enter));
        map.remove_marker(id);
        assert!(map.drain_events().is_empty());
        assert!(!map.pointer(id, PointerKind::Click));
        assert!(map.markers().is_empty());
    }

    #[test]
    fn test_fly_to_and_remove() {
        let mut map = HeadlessMap::new(size());
        map.fly_to(FlyToOptions {
            center: GeoPoint::new(2.35, 48.85),
            zoom: 14.0,
            speed: 4.0,
            duration: std::time::Duration::from_millis(1000),
            essential: true,
        });
        assert_eq!(map.viewport().zoom, 14.0);
        map.remove();
        assert!(map.is_removed());
    }
}
