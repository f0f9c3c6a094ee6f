//! Event catalog and location resolution.
//!
//! Records are validated once when the dataset is loaded. After that every
//! listing is a pure function of the stored records and may be recomputed
//! freely.

use crate::error::{DataError, EventMapError, Result};
use crate::types::{EventLocation, EventRecord, GeoPoint, PlanarCoordinate};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Maps a normalized planar coordinate to lon/lat with an equirectangular
/// projection. Out-of-range input yields out-of-range output.
pub fn to_lng_lat(x: f64, y: f64) -> GeoPoint {
    let longitude = -180.0 + (x / 100.0) * 360.0;
    let latitude = 90.0 - (y / 100.0) * 180.0;
    GeoPoint::new(longitude, latitude)
}

/// Which representation a record's location comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationSource {
    Explicit(GeoPoint),
    Planar(PlanarCoordinate),
}

impl LocationSource {
    /// Picks the location representation of a record.
    ///
    /// Explicit coordinates need both longitude and latitude; a lone value is
    /// ignored in favor of the planar pair.
    pub fn of(record: &EventRecord) -> Option<Self> {
        match (record.longitude, record.latitude, record.coordinates) {
            (Some(lon), Some(lat), _) => Some(Self::Explicit(GeoPoint::new(lon, lat))),
            (_, _, Some(planar)) => Some(Self::Planar(planar)),
            _ => None,
        }
    }

    pub fn resolve(&self) -> GeoPoint {
        match self {
            LocationSource::Explicit(point) => *point,
            LocationSource::Planar(p) => to_lng_lat(p.x, p.y),
        }
    }
}

/// Resolves the location of a single record.
///
/// # Errors
///
/// Returns [`DataError::MissingLocation`] when the record carries neither
/// location form.
pub fn resolve_location(record: &EventRecord) -> std::result::Result<GeoPoint, DataError> {
    LocationSource::of(record)
        .map(|source| source.resolve())
        .ok_or_else(|| DataError::missing_location(record.id()))
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    record: EventRecord,
    source: LocationSource,
}

impl CatalogEntry {
    fn to_location(&self) -> EventLocation {
        let point = self.source.resolve();
        EventLocation {
            details: self.record.details.clone(),
            longitude: point.longitude,
            latitude: point.latitude,
        }
    }
}

/// The read-only, ordered event dataset.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    entries: Vec<CatalogEntry>,
}

impl EventCatalog {
    /// Validates and stores records in source order.
    ///
    /// # Errors
    ///
    /// Rejects records without a location, with duplicate ids, with
    /// non-finite coordinates, or with explicit coordinates outside the
    /// geographic range.
    pub fn from_records(records: Vec<EventRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.id().to_string()) {
                return Err(DataError::DuplicateId {
                    id: record.id().to_string(),
                }
                .into());
            }

            let source = LocationSource::of(&record)
                .ok_or_else(|| DataError::missing_location(record.id()))?;
            validate_source(record.id(), &source)?;

            entries.push(CatalogEntry { record, source });
        }

        debug!(events = entries.len(), "Event catalog loaded");
        Ok(Self { entries })
    }

    /// Parses a JSON array of records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<EventRecord> =
            serde_json::from_str(json).map_err(|e| DataError::InvalidFormat {
                reason: e.to_string(),
            })?;
        Self::from_records(records)
    }

    /// Loads a JSON dataset from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(EventMapError::from)?;
        Self::from_json_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &EventRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Returns every event with its location resolved, in source order.
    pub fn list_event_locations(&self) -> Vec<EventLocation> {
        self.entries.iter().map(CatalogEntry::to_location).collect()
    }

    /// Looks up a single event by id.
    pub fn event_location_by_id(&self, id: &str) -> Option<EventLocation> {
        self.entries
            .iter()
            .find(|e| e.record.id() == id)
            .map(CatalogEntry::to_location)
    }
}

fn validate_source(id: &str, source: &LocationSource) -> Result<()> {
    match source {
        LocationSource::Explicit(point) => {
            if !point.longitude.is_finite() {
                return Err(DataError::non_finite(id, "longitude").into());
            }
            if !point.latitude.is_finite() {
                return Err(DataError::non_finite(id, "latitude").into());
            }
            if !(-180.0..=180.0).contains(&point.longitude) {
                return Err(DataError::OutOfRange {
                    id: id.to_string(),
                    field: "longitude".to_string(),
                    value: point.longitude,
                }
                .into());
            }
            if !(-90.0..=90.0).contains(&point.latitude) {
                return Err(DataError::OutOfRange {
                    id: id.to_string(),
                    field: "latitude".to_string(),
                    value: point.latitude,
                }
                .into());
            }
        }
        LocationSource::Planar(planar) => {
            if !planar.x.is_finite() {
                return Err(DataError::non_finite(id, "coordinates.x").into());
            }
            if !planar.y.is_finite() {
                return Err(DataError::non_finite(id, "coordinates.y").into());
            }
            if !planar.is_normalized() {
                warn!(
                    event = id,
                    x = planar.x,
                    y = planar.y,
                    "Planar coordinates outside [0, 100]; resolved location will be off the map"
                );
            }
        }
    }
    Ok(())
}
