//! Keyed marker overlays and their pointer interactions.

use eventmap_core::engine::{MapContext, MapEvent, MarkerAnchor, MarkerId, MarkerSpec, PointerKind};
use eventmap_core::types::{EventLocation, GeoPoint, ScreenPoint};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Data that can be shown as a marker.
pub trait MarkerItem: Clone {
    /// Stable identity used to match markers across list updates.
    fn key(&self) -> &str;

    fn position(&self) -> GeoPoint;

    fn label(&self) -> String;
}

impl MarkerItem for EventLocation {
    fn key(&self) -> &str {
        self.id()
    }

    fn position(&self) -> GeoPoint {
        self.point()
    }

    fn label(&self) -> String {
        self.details.name.clone()
    }
}

/// Placement of a marker element relative to its coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub anchor: MarkerAnchor,
    pub offset: ScreenPoint,
}

impl MarkerStyle {
    /// Event pins sit on their point, nudged 8px down.
    pub const EVENT: MarkerStyle = MarkerStyle {
        anchor: MarkerAnchor::Bottom,
        offset: ScreenPoint { x: 0.0, y: 8.0 },
    };

    /// Search result pins are centered.
    pub const LOCATION: MarkerStyle = MarkerStyle {
        anchor: MarkerAnchor::Center,
        offset: ScreenPoint { x: 0.0, y: 0.0 },
    };
}

/// What a pointer interaction on a marker means for its item.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerAction<T> {
    /// Pointer entered (`Some`) or left (`None`)
    Hover(Option<T>),
    Click(T),
}

#[derive(Debug, Clone)]
struct Placed<T> {
    marker: MarkerId,
    item: T,
}

/// A set of markers kept in lockstep with a list of items.
#[derive(Debug, Clone)]
pub struct MarkerLayer<T> {
    style: MarkerStyle,
    placed: BTreeMap<String, Placed<T>>,
    by_marker: HashMap<MarkerId, String>,
}

impl<T: MarkerItem> MarkerLayer<T> {
    pub fn new(style: MarkerStyle) -> Self {
        Self {
            style,
            placed: BTreeMap::new(),
            by_marker: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn marker_for(&self, key: &str) -> Option<MarkerId> {
        self.placed.get(key).map(|p| p.marker)
    }

    /// Reconciles the placed markers with `items`: markers for vanished keys
    /// are removed, moved items are re-placed, new keys get a marker. Does
    /// nothing before the map is ready.
    pub fn sync(&mut self, ctx: &MapContext, items: &[T]) {
        let synced = ctx.with(|engine| {
            let wanted: HashMap<&str, &T> = items.iter().map(|i| (i.key(), i)).collect();

            let stale: Vec<String> = self
                .placed
                .iter()
                .filter(|(key, placed)| {
                    wanted
                        .get(key.as_str())
                        .map_or(true, |item| item.position() != placed.item.position())
                })
                .map(|(key, _)| key.clone())
                .collect();
            for key in &stale {
                if let Some(placed) = self.placed.remove(key) {
                    engine.remove_marker(placed.marker);
                    self.by_marker.remove(&placed.marker);
                }
            }

            for item in items {
                if let Some(placed) = self.placed.get_mut(item.key()) {
                    placed.item = item.clone();
                    continue;
                }
                let marker = engine.add_marker(MarkerSpec {
                    position: item.position(),
                    anchor: self.style.anchor,
                    offset: self.style.offset,
                    label: item.label(),
                });
                trace!(key = item.key(), %marker, "Marker placed");
                self.by_marker.insert(marker, item.key().to_string());
                self.placed.insert(
                    item.key().to_string(),
                    Placed {
                        marker,
                        item: item.clone(),
                    },
                );
            }
            stale.len()
        });

        if let Some(removed) = synced {
            debug!(markers = self.placed.len(), removed, "Markers synced");
        }
    }

    /// Translates an engine signal into an action on this layer's items.
    /// Signals for other markers yield `None`.
    pub fn dispatch(&self, event: &MapEvent) -> Option<MarkerAction<T>> {
        let MapEvent::Marker { marker, pointer } = event else {
            return None;
        };
        let key = self.by_marker.get(marker)?;
        let item = self.placed.get(key)?.item.clone();
        Some(match pointer {
            PointerKind::Enter => MarkerAction::Hover(Some(item)),
            PointerKind::Leave => MarkerAction::Hover(None),
            PointerKind::Click => MarkerAction::Click(item),
        })
    }

    /// Removes every marker and its listeners from the map.
    pub fn clear(&mut self, ctx: &MapContext) {
        let markers: Vec<MarkerId> = self.by_marker.keys().copied().collect();
        ctx.with(|engine| {
            for marker in &markers {
                engine.remove_marker(*marker);
            }
        });
        self.placed.clear();
        self.by_marker.clear();
    }
}
