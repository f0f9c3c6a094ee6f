//! Common test utilities and helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use eventmap::MapApp;
use eventmap_core::config::AppConfig;
use eventmap_core::engine::{MapEngine, MarkerId};
use eventmap_core::events::EventCatalog;
use eventmap_core::headless::HeadlessMap;
use eventmap_core::style::StyleDocument;
use eventmap_core::types::GeoPoint;
use eventmap_search::{Geocoder, LocationFeature, SearchError};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

pub const STREETS: &str = "mapbox://styles/acme/streets";
pub const DARK: &str = "mapbox://styles/acme/dark";
pub const TERRAIN: &str = "mapbox://styles/acme/terrain";

/// Get the path to test fixtures
pub fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir).join("tests").join("fixtures")
}

pub fn sample_catalog() -> EventCatalog {
    let path = fixtures_dir().join("events.json");
    EventCatalog::from_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load {:?}: {}", path, e))
}

pub fn sample_style() -> StyleDocument {
    let path = fixtures_dir().join("style.json");
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read style from {:?}", path));
    StyleDocument::from_json_str(&content).expect("Failed to parse sample style")
}

/// Configuration with a token, three style options and a dark background.
pub fn app_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.map.access_token = Some("pk.test-token".to_string());
    config.map.styles.default = Some(STREETS.to_string());
    config.map.styles.alt2 = Some(DARK.to_string());
    config.map.styles.terrain = Some(TERRAIN.to_string());
    config
        .theme
        .dark
        .insert("background".to_string(), "#1A1410".to_string());
    config
}

pub fn app(config: AppConfig, geocoder: Arc<dyn Geocoder>) -> MapApp {
    MapApp::new(config, &sample_catalog(), geocoder)
}

/// Mounts a headless engine with every configured style registered and
/// finishes the initial style load. The returned clone shares state with the
/// mounted engine.
pub fn mount_headless(app: &MapApp) -> HeadlessMap {
    let map = HeadlessMap::new(eventmap_core::config::ViewportConfig::default().size());
    for url in [STREETS, DARK, TERRAIN] {
        map.register_style(url, sample_style());
    }

    let engine = map.clone();
    app.mount(move |options| {
        let mut engine = engine;
        engine
            .set_style(&options.style_url)
            .expect("initial style is registered");
        Box::new(engine)
    })
    .expect("Failed to mount map");

    assert!(map.complete_style_load());
    map
}

/// Marker whose label is `label`.
pub fn marker_labelled(map: &HeadlessMap, label: &str) -> MarkerId {
    map.markers()
        .into_iter()
        .find(|(_, spec)| spec.label == label)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("No marker labelled '{}'", label))
}

pub fn paint_of(map: &HeadlessMap, layer: &str, property: &str) -> Option<String> {
    map.style_document()
        .layer(layer)
        .and_then(|l| l.paint_value(property))
        .and_then(|v| v.as_str().map(str::to_string))
}

/// Geocoder answering every query with one feature per configured name.
#[derive(Debug, Default)]
pub struct MockGeocoder {
    calls: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationFeature>, SearchError> {
        self.calls.lock().push(query.to_string());
        let features = [
            ("Berlin", GeoPoint::new(13.405, 52.52)),
            ("Bern", GeoPoint::new(7.4474, 46.948)),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, point))| LocationFeature::point(format!("osm-{}", i), name, point))
        .take(limit)
        .collect();
        Ok(features)
    }
}
