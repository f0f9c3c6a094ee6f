//! Core types for EventMap.
//!
//! Geographic points, the event record as it arrives from the dataset, the
//! resolved event location handed to the UI, and the screen-space geometry
//! shared by the camera and the map engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic position in degrees.
///
/// # Examples
///
/// ```
/// use eventmap_core::types::GeoPoint;
///
/// let berlin = GeoPoint::new(13.405, 52.52);
/// assert!(berlin.is_in_range());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint {
        longitude: 0.0,
        latitude: 0.0,
    };

    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns true if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Returns true if longitude is in [-180, 180] and latitude in [-90, 90].
    pub fn is_in_range(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }

    /// Returns the `[lon, lat]` pair used by GeoJSON and map engines.
    pub fn to_array(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(lng_lat: [f64; 2]) -> Self {
        Self::new(lng_lat[0], lng_lat[1])
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.longitude, self.latitude)
    }
}

/// A normalized planar placement, each axis in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarCoordinate {
    pub x: f64,
    pub y: f64,
}

impl PlanarCoordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both axes lie within the documented [0, 100] domain.
    pub fn is_normalized(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

/// Whether an event already happened or is still to come.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Past,
    Upcoming,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Past => write!(f, "past"),
            EventKind::Upcoming => write!(f, "upcoming"),
        }
    }
}

/// Social handles attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// Descriptive fields shared by [`EventRecord`] and [`EventLocation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub id: String,
    pub name: String,
    pub city: String,
    pub country: String,
    /// ISO date string
    pub date: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_price: Option<String>,
}

/// An event as it appears in the static dataset.
///
/// The location is given either as explicit `longitude`/`latitude` or as a
/// planar `coordinates` pair. Explicit coordinates win when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub details: EventDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<PlanarCoordinate>,
}

impl EventRecord {
    pub fn id(&self) -> &str {
        &self.details.id
    }
}

/// An event with its location resolved to a concrete [`GeoPoint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    #[serde(flatten)]
    pub details: EventDetails,
    pub longitude: f64,
    pub latitude: f64,
}

impl EventLocation {
    pub fn id(&self) -> &str {
        &self.details.id
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// A position in screen pixels, origin at the top-left of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pixel margins reserved on each edge of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Padding {
    pub const ZERO: Padding = Padding {
        top: 0.0,
        bottom: 0.0,
        left: 0.0,
        right: 0.0,
    };

    /// Same margin on all four sides.
    pub fn uniform(margin: f64) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }
}

/// Camera state as rendered by the map engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub center: GeoPoint,
    pub zoom: f64,
    pub padding: Padding,
    pub pixel_offset: ScreenPoint,
}

impl ViewportState {
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.max(0.0),
            padding: Padding::ZERO,
            pixel_offset: ScreenPoint::default(),
        }
    }
}
