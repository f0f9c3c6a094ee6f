//! Semantic classification of style layers.
//!
//! A layer is classified from its type and a lowercase substring match on
//! its id. Rules are checked in order within a type and the first match
//! wins. Layers matching no rule get no class and are never recolored.

use crate::palette::Palette;
use eventmap_core::style::{LayerType, PaintValue};
use serde::Serialize;
use serde_json::json;

/// What a layer represents, as far as theming is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerClass {
    Background,
    WaterFill,
    ParkFill,
    BuildingFill,
    LandFill,
    BuildingExtrusion,
    WaterLine,
    BoundaryLine,
    MajorRoad,
    MinorRoad,
    Label,
}

/// A single paint property assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintWrite {
    pub property: &'static str,
    pub value: PaintValue,
}

impl PaintWrite {
    fn color(property: &'static str, color: &str) -> Self {
        Self {
            property,
            value: PaintValue::String(color.to_string()),
        }
    }
}

const PARK_KEYWORDS: &[&str] = &["park", "green", "wood", "forest", "grass"];
const LAND_KEYWORDS: &[&str] = &["land", "landuse", "landcover"];
const ROAD_KEYWORDS: &[&str] = &["road", "bridge", "tunnel"];
const MAJOR_ROAD_KEYWORDS: &[&str] = &["motorway", "primary"];

/// Halo width for symbol labels, in pixels.
pub const LABEL_HALO_WIDTH: f64 = 0.5;

fn contains_any(id: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| id.contains(k))
}

/// Classifies a layer, or returns `None` when no rule matches.
pub fn classify(layer_type: &LayerType, id: &str) -> Option<LayerClass> {
    let id = id.to_lowercase();
    match layer_type {
        LayerType::Background => Some(LayerClass::Background),
        LayerType::Fill => {
            if id.contains("water") {
                Some(LayerClass::WaterFill)
            } else if contains_any(&id, PARK_KEYWORDS) {
                Some(LayerClass::ParkFill)
            } else if id.contains("building") {
                Some(LayerClass::BuildingFill)
            } else if contains_any(&id, LAND_KEYWORDS) {
                Some(LayerClass::LandFill)
            } else {
                None
            }
        }
        LayerType::FillExtrusion => id
            .contains("building")
            .then_some(LayerClass::BuildingExtrusion),
        LayerType::Line => {
            if id.contains("water") {
                Some(LayerClass::WaterLine)
            } else if id.contains("boundary") {
                Some(LayerClass::BoundaryLine)
            } else if contains_any(&id, ROAD_KEYWORDS) {
                if contains_any(&id, MAJOR_ROAD_KEYWORDS) {
                    Some(LayerClass::MajorRoad)
                } else {
                    Some(LayerClass::MinorRoad)
                }
            } else {
                None
            }
        }
        LayerType::Symbol => Some(LayerClass::Label),
        _ => None,
    }
}

impl LayerClass {
    /// The paint writes for this class under the given palette, in the
    /// order they are applied.
    pub fn paint(&self, palette: &Palette) -> Vec<PaintWrite> {
        match self {
            Self::Background => vec![PaintWrite::color("background-color", &palette.background)],
            Self::WaterFill => vec![PaintWrite::color("fill-color", &palette.water)],
            Self::ParkFill => vec![PaintWrite::color("fill-color", &palette.park)],
            Self::BuildingFill => vec![PaintWrite::color("fill-color", &palette.card)],
            Self::LandFill => vec![PaintWrite::color("fill-color", &palette.muted)],
            Self::BuildingExtrusion => {
                vec![PaintWrite::color("fill-extrusion-color", &palette.card)]
            }
            Self::WaterLine => vec![PaintWrite::color("line-color", &palette.water)],
            Self::BoundaryLine => vec![PaintWrite::color("line-color", &palette.border)],
            Self::MajorRoad => vec![PaintWrite::color("line-color", &palette.road)],
            Self::MinorRoad => vec![PaintWrite::color("line-color", &palette.road_secondary)],
            Self::Label => vec![
                PaintWrite::color("text-color", &palette.label),
                PaintWrite::color("icon-color", &palette.label),
                PaintWrite::color("text-halo-color", &palette.background),
                PaintWrite {
                    property: "text-halo-width",
                    value: json!(LABEL_HALO_WIDTH),
                },
            ],
        }
    }
}

/// Classifies a layer and returns its paint writes; empty when unclassified.
pub fn paint_for(layer_type: &LayerType, id: &str, palette: &Palette) -> Vec<PaintWrite> {
    classify(layer_type, id)
        .map(|class| class.paint(palette))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rules() {
        assert_eq!(classify(&LayerType::Fill, "water-shadow"), Some(LayerClass::WaterFill));
        assert_eq!(classify(&LayerType::Fill, "national-park"), Some(LayerClass::ParkFill));
        assert_eq!(classify(&LayerType::Fill, "landcover-wood"), Some(LayerClass::ParkFill));
        assert_eq!(classify(&LayerType::Fill, "building"), Some(LayerClass::BuildingFill));
        assert_eq!(classify(&LayerType::Fill, "landuse"), Some(LayerClass::LandFill));
        assert_eq!(classify(&LayerType::Fill, "mystery-layer-42"), None);
    }

    #[test]
    fn test_first_match_wins() {
        // water beats park, park beats land
        assert_eq!(classify(&LayerType::Fill, "park-water"), Some(LayerClass::WaterFill));
        assert_eq!(classify(&LayerType::Fill, "land-grass"), Some(LayerClass::ParkFill));
        assert_eq!(classify(&LayerType::Line, "waterway-tunnel"), Some(LayerClass::WaterLine));
        assert_eq!(
            classify(&LayerType::Line, "admin-boundary-road"),
            Some(LayerClass::BoundaryLine)
        );
    }

    #[test]
    fn test_road_rules() {
        assert_eq!(classify(&LayerType::Line, "road-primary"), Some(LayerClass::MajorRoad));
        assert_eq!(classify(&LayerType::Line, "bridge-motorway-trunk"), Some(LayerClass::MajorRoad));
        assert_eq!(classify(&LayerType::Line, "road-street"), Some(LayerClass::MinorRoad));
        assert_eq!(classify(&LayerType::Line, "tunnel-path"), Some(LayerClass::MinorRoad));
        assert_eq!(classify(&LayerType::Line, "ferry"), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify(&LayerType::Fill, "Water"), Some(LayerClass::WaterFill));
        assert_eq!(classify(&LayerType::Line, "ROAD-Primary"), Some(LayerClass::MajorRoad));
    }

    #[test]
    fn test_type_gates_rules() {
        assert_eq!(classify(&LayerType::Background, "anything"), Some(LayerClass::Background));
        assert_eq!(classify(&LayerType::Symbol, "poi-label"), Some(LayerClass::Label));
        assert_eq!(
            classify(&LayerType::FillExtrusion, "building-3d"),
            Some(LayerClass::BuildingExtrusion)
        );
        assert_eq!(classify(&LayerType::FillExtrusion, "water"), None);
        assert_eq!(classify(&LayerType::Circle, "water"), None);
        assert_eq!(classify(&LayerType::Other, "road"), None);
        assert_eq!(classify(&LayerType::Raster, "satellite"), None);
    }

    #[test]
    fn test_paint_values() {
        let palette = Palette::default();

        let writes = paint_for(&LayerType::Line, "road-street", &palette);
        assert_eq!(writes, vec![PaintWrite::color("line-color", &palette.road_secondary)]);

        let writes = paint_for(&LayerType::Symbol, "place-label", &palette);
        let props: Vec<_> = writes.iter().map(|w| w.property).collect();
        assert_eq!(props, ["text-color", "icon-color", "text-halo-color", "text-halo-width"]);
        assert_eq!(writes[2].value, json!(palette.background));
        assert_eq!(writes[3].value, json!(0.5));

        assert!(paint_for(&LayerType::Fill, "mystery-layer-42", &palette).is_empty());
    }
}
