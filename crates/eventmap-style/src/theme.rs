//! Re-theming pass over the loaded map style.

use crate::classify::classify;
use crate::palette::Palette;
use eventmap_core::engine::MapEngine;
use eventmap_core::error::EngineError;
use metrics::{counter, describe_counter};
use serde::Serialize;
use tracing::{debug, trace};

/// A paint write the engine refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintFailure {
    pub layer: String,
    pub property: String,
    pub error: EngineError,
}

/// Outcome of one [`apply_theme`] pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThemeReport {
    /// The style was not loaded, so nothing was touched
    pub skipped: bool,
    pub layers: usize,
    pub classified: usize,
    pub writes: usize,
    pub failures: Vec<PaintFailure>,
}

/// Registers descriptions for the theming counters.
pub fn describe_metrics() {
    describe_counter!("theme_passes_total", "Re-theming passes that ran");
    describe_counter!("theme_passes_skipped_total", "Re-theming passes skipped before style load");
    describe_counter!("theme_paint_writes_total", "Paint properties written");
    describe_counter!("theme_paint_failures_total", "Paint writes rejected by the engine");
}

/// Recolors every classified layer of the current style.
///
/// A no-op while the style is loading; callers re-invoke on the next style
/// signal. A rejected write is recorded in the report and the pass carries
/// on. Every call rewrites every classified layer, so repeating it is safe.
pub fn apply_theme(engine: &mut dyn MapEngine, palette: &Palette) -> ThemeReport {
    if !engine.is_style_loaded() {
        debug!("Style not loaded, skipping theme pass");
        counter!("theme_passes_skipped_total").increment(1);
        return ThemeReport {
            skipped: true,
            ..ThemeReport::default()
        };
    }

    let layers = engine.style_layers();
    let mut report = ThemeReport {
        layers: layers.len(),
        ..ThemeReport::default()
    };

    for layer in &layers {
        let Some(class) = classify(&layer.layer_type, &layer.id) else {
            continue;
        };
        report.classified += 1;
        trace!(layer = %layer.id, ?class, "Layer classified");

        for write in class.paint(palette) {
            // the layer list is a snapshot; the layer may be gone by now
            if !engine.has_layer(&layer.id) {
                debug!(layer = %layer.id, "Layer removed during theme pass");
                report.failures.push(PaintFailure {
                    layer: layer.id.clone(),
                    property: write.property.to_string(),
                    error: EngineError::UnknownLayer {
                        layer: layer.id.clone(),
                    },
                });
                break;
            }
            match engine.set_paint_property(&layer.id, write.property, write.value) {
                Ok(()) => report.writes += 1,
                Err(error) => {
                    debug!(
                        layer = %layer.id,
                        property = write.property,
                        error = %error,
                        "Paint write rejected"
                    );
                    report.failures.push(PaintFailure {
                        layer: layer.id.clone(),
                        property: write.property.to_string(),
                        error,
                    });
                }
            }
        }
    }

    counter!("theme_passes_total").increment(1);
    counter!("theme_paint_writes_total").increment(report.writes as u64);
    counter!("theme_paint_failures_total").increment(report.failures.len() as u64);

    debug!(
        layers = report.layers,
        classified = report.classified,
        writes = report.writes,
        failures = report.failures.len(),
        "Theme applied"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventmap_core::engine::{EaseOptions, FlyToOptions, MapEvent, MarkerId, MarkerSpec};
    use eventmap_core::headless::HeadlessMap;
    use eventmap_core::style::{LayerType, PaintValue, StyleDocument, StyleLayer};
    use eventmap_core::types::{GeoPoint, ScreenPoint, ScreenSize};
    use serde_json::json;

    fn sample_style() -> StyleDocument {
        StyleDocument::from_layers(vec![
            StyleLayer::new("land", LayerType::Background),
            StyleLayer::new("water-shadow", LayerType::Fill),
            StyleLayer::new("mystery-layer-42", LayerType::Fill),
            StyleLayer::new("road-primary", LayerType::Line),
            StyleLayer::new("road-street", LayerType::Line),
            StyleLayer::new("place-label", LayerType::Symbol),
            StyleLayer::new("hillshade", LayerType::Hillshade),
        ])
    }

    fn loaded_map() -> HeadlessMap {
        let map = HeadlessMap::new(ScreenSize::new(800.0, 600.0));
        map.load_document(sample_style());
        map
    }

    #[test]
    fn test_classified_layers_recolored() {
        let map = loaded_map();
        let palette = Palette::default();
        let report = apply_theme(&mut map.clone(), &palette);

        assert!(!report.skipped);
        assert_eq!(report.layers, 7);
        assert_eq!(report.classified, 5);
        // 1 + 1 + 1 + 1 + 4
        assert_eq!(report.writes, 8);
        assert!(report.failures.is_empty());

        let doc = map.style_document();
        let paint = |id: &str, prop: &str| doc.layer(id).and_then(|l| l.paint_value(prop)).cloned();
        assert_eq!(paint("water-shadow", "fill-color"), Some(json!(palette.water)));
        assert_eq!(paint("road-primary", "line-color"), Some(json!(palette.road)));
        assert_eq!(paint("road-street", "line-color"), Some(json!(palette.road_secondary)));
        assert_eq!(paint("land", "background-color"), Some(json!(palette.background)));
        assert_eq!(paint("place-label", "text-halo-width"), Some(json!(0.5)));
        assert!(doc.layer("mystery-layer-42").map(|l| l.paint.is_empty()).unwrap_or(false));
        assert!(doc.layer("hillshade").map(|l| l.paint.is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_idempotent() {
        let map = loaded_map();
        let palette = Palette::default();
        let first = apply_theme(&mut map.clone(), &palette);
        let after_first = map.style_document();
        let second = apply_theme(&mut map.clone(), &palette);

        assert_eq!(first, second);
        assert_eq!(map.style_document(), after_first);
        // no diffing: the second pass writes again
        assert_eq!(map.paint_writes(), first.writes * 2);
    }

    #[test]
    fn test_skipped_before_style_load() {
        let map = HeadlessMap::new(ScreenSize::new(800.0, 600.0));
        map.register_style("mapbox://styles/test", sample_style());
        let mut engine = map.clone();
        engine.set_style("mapbox://styles/test").unwrap();

        let report = apply_theme(&mut engine, &Palette::default());
        assert!(report.skipped);
        assert_eq!(report.writes, 0);
        assert_eq!(map.paint_writes(), 0);
    }

    /// Reports one extra layer in its snapshot that the style no longer has.
    struct VanishingLayer {
        inner: HeadlessMap,
        gone: StyleLayer,
    }

    impl MapEngine for VanishingLayer {
        fn set_style(&mut self, url: &str) -> Result<(), EngineError> {
            self.inner.set_style(url)
        }
        fn ease_to(&mut self, options: EaseOptions) {
            self.inner.ease_to(options)
        }
        fn fly_to(&mut self, options: FlyToOptions) {
            self.inner.fly_to(options)
        }
        fn project(&self, point: GeoPoint) -> ScreenPoint {
            self.inner.project(point)
        }
        fn zoom(&self) -> f64 {
            self.inner.zoom()
        }
        fn viewport_size(&self) -> ScreenSize {
            self.inner.viewport_size()
        }
        fn is_style_loaded(&self) -> bool {
            self.inner.is_style_loaded()
        }
        fn style_layers(&self) -> Vec<StyleLayer> {
            let mut layers = vec![self.gone.clone()];
            layers.extend(self.inner.style_layers());
            layers
        }
        fn has_layer(&self, layer_id: &str) -> bool {
            self.inner.has_layer(layer_id)
        }
        fn set_paint_property(
            &mut self,
            layer_id: &str,
            property: &str,
            value: PaintValue,
        ) -> Result<(), EngineError> {
            self.inner.set_paint_property(layer_id, property, value)
        }
        fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
            self.inner.add_marker(marker)
        }
        fn remove_marker(&mut self, marker: MarkerId) {
            self.inner.remove_marker(marker)
        }
        fn drain_events(&mut self) -> Vec<MapEvent> {
            self.inner.drain_events()
        }
        fn remove(&mut self) {
            self.inner.remove()
        }
    }

    #[test]
    fn test_vanished_layer_counts_as_failure() {
        let mut engine = VanishingLayer {
            inner: loaded_map(),
            gone: StyleLayer::new("water-old", LayerType::Fill),
        };

        let report = apply_theme(&mut engine, &Palette::default());
        assert_eq!(report.layers, 8);
        assert_eq!(report.classified, 6);
        assert_eq!(report.writes, 8);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].layer, "water-old");
        assert_eq!(report.failures[0].property, "fill-color");
        assert_eq!(
            report.failures[0].error,
            EngineError::UnknownLayer {
                layer: "water-old".to_string()
            }
        );
    }

    #[test]
    fn test_rejected_write_does_not_abort_pass() {
        let map = loaded_map();
        map.reject_property("water-shadow", "fill-color");
        map.reject_property("place-label", "icon-color");

        let report = apply_theme(&mut map.clone(), &Palette::default());
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.writes, 6);
        assert_eq!(report.failures[0].layer, "water-shadow");
        assert!(matches!(report.failures[0].error, EngineError::Rejected { .. }));

        let doc = map.style_document();
        let label = doc.layer("place-label").unwrap();
        assert!(label.paint_value("text-color").is_some());
        assert!(label.paint_value("icon-color").is_none());
        assert!(label.paint_value("text-halo-color").is_some());
    }

    #[test]
    fn test_building_extrusion_written() {
        let map = HeadlessMap::new(ScreenSize::new(400.0, 400.0));
        map.load_document(StyleDocument::from_layers(vec![StyleLayer::new(
            "building-3d",
            LayerType::FillExtrusion,
        )]));
        let palette = Palette::default();
        let report = apply_theme(&mut map.clone(), &palette);
        assert_eq!(report.writes, 1);
        assert!(report.failures.is_empty());

        let doc = map.style_document();
        assert_eq!(
            doc.layer("building-3d").and_then(|l| l.paint_value("fill-extrusion-color")),
            Some(&json!(palette.card))
        );
    }
}
