//! Style layer model shared with the map engine.
//!
//! A style is an ordered list of layers. The engine owns the layers; callers
//! only read them and rewrite individual paint entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single paint value (color string, width number, expression array).
pub type PaintValue = serde_json::Value;

/// Layer type as declared by the style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerType {
    Background,
    Fill,
    FillExtrusion,
    Line,
    Symbol,
    Circle,
    Heatmap,
    Raster,
    Hillshade,
    Sky,
    #[serde(other)]
    Other,
}

impl LayerType {
    /// Paint property prefixes this layer type accepts.
    pub fn paint_prefixes(&self) -> &'static [&'static str] {
        match self {
            LayerType::Background => &["background-"],
            LayerType::Fill => &["fill-"],
            LayerType::FillExtrusion => &["fill-extrusion-"],
            LayerType::Line => &["line-"],
            LayerType::Symbol => &["text-", "icon-"],
            LayerType::Circle => &["circle-"],
            LayerType::Heatmap => &["heatmap-"],
            LayerType::Raster => &["raster-"],
            LayerType::Hillshade => &["hillshade-"],
            LayerType::Sky => &["sky-"],
            LayerType::Other => &[],
        }
    }

    /// Returns true if `property` is a paint property of this layer type.
    pub fn accepts(&self, property: &str) -> bool {
        // "fill-extrusion-color" starts with "fill-" but is not a fill property
        if *self == LayerType::Fill && property.starts_with("fill-extrusion-") {
            return false;
        }
        self.paint_prefixes()
            .iter()
            .any(|prefix| property.starts_with(prefix))
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerType::Background => "background",
            LayerType::Fill => "fill",
            LayerType::FillExtrusion => "fill-extrusion",
            LayerType::Line => "line",
            LayerType::Symbol => "symbol",
            LayerType::Circle => "circle",
            LayerType::Heatmap => "heatmap",
            LayerType::Raster => "raster",
            LayerType::Hillshade => "hillshade",
            LayerType::Sky => "sky",
            LayerType::Other => "other",
        };
        f.write_str(name)
    }
}

/// One drawable layer of a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    #[serde(default)]
    pub paint: BTreeMap<String, PaintValue>,
    /// Source, filter, layout and every other key, carried through untouched
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_json::Value>,
}

impl StyleLayer {
    pub fn new(id: impl Into<String>, layer_type: LayerType) -> Self {
        Self {
            id: id.into(),
            layer_type,
            paint: BTreeMap::new(),
            rest: BTreeMap::new(),
        }
    }

    pub fn paint_value(&self, property: &str) -> Option<&PaintValue> {
        self.paint.get(property)
    }
}

/// A style document. Only the layer list is interpreted; every other key is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleDocument {
    #[serde(default)]
    pub layers: Vec<StyleLayer>,
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_json::Value>,
}

impl StyleDocument {
    pub fn from_layers(layers: Vec<StyleLayer>) -> Self {
        Self {
            layers,
            rest: BTreeMap::new(),
        }
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn layer(&self, id: &str) -> Option<&StyleLayer> {
        self.layers.iter().find(|l| l.id == id)
    }
}
