//! Canonical place features and normalization of Photon results.

use eventmap_core::types::GeoPoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A geocoded place in GeoJSON `Feature` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maki: Option<String>,
    #[serde(default)]
    pub poi_category: Vec<String>,
}

impl LocationFeature {
    pub fn point(id: impl Into<String>, name: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: position.to_array(),
            },
            properties: FeatureProperties {
                id: id.into(),
                name: name.into(),
                ..FeatureProperties::default()
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.properties.id
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::from(self.geometry.coordinates)
    }

    /// Icon for the result list: from the maki key when set, otherwise the
    /// first POI category.
    pub fn icon(&self) -> &'static str {
        self.properties
            .maki
            .as_deref()
            .or_else(|| self.properties.poi_category.first().map(String::as_str))
            .map_or(DEFAULT_ICON, icon_for)
    }
}

/// Icon used when no category is recognized.
pub const DEFAULT_ICON: &str = "map-pin";

/// Maps a provider category key to an icon name.
pub fn icon_for(category: &str) -> &'static str {
    match category.trim().to_lowercase().as_str() {
        "café" | "cafe" | "coffee" => "coffee",
        "restaurant" | "food" => "utensils",
        "hotel" | "lodging" => "hotel",
        "gym" => "dumbbell",
        "bank" => "banknote",
        "shopping" => "shopping-bag",
        "store" => "store",
        "government" => "landmark",
        "school" => "graduation-cap",
        "hospital" => "stethoscope",
        "clothing" => "shirt",
        "home" => "home",
        _ => DEFAULT_ICON,
    }
}

/// Body of a Photon `/api` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotonResponse {
    #[serde(default)]
    pub features: Vec<PhotonFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotonFeature {
    pub geometry: PhotonGeometry,
    #[serde(default)]
    pub properties: PhotonProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotonGeometry {
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotonProperties {
    pub name: Option<String>,
    pub street: Option<String>,
    pub housenumber: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub osm_key: Option<String>,
    pub osm_value: Option<String>,
    /// Numeric in practice; strings are tolerated
    pub osm_id: Option<Value>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl PhotonProperties {
    /// Address parts joined by `", "`, skipping absent ones.
    fn place(&self) -> String {
        let locality = present(&self.city)
            .or_else(|| present(&self.town))
            .or_else(|| present(&self.village));
        [
            present(&self.housenumber),
            present(&self.street),
            locality,
            present(&self.state),
            present(&self.postcode),
            present(&self.country),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }

    fn osm_id(&self) -> Option<String> {
        match self.osm_id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl PhotonFeature {
    /// Converts to the canonical shape. `index` is the position in the
    /// response and only feeds the fallback id.
    pub fn normalize(&self, index: usize) -> LocationFeature {
        let props = &self.properties;
        let [longitude, latitude] = self.geometry.coordinates;
        let name = present(&props.name)
            .or_else(|| present(&props.street))
            .unwrap_or("Unknown");
        let place = props.place();
        let id = props
            .osm_id()
            .unwrap_or_else(|| format!("{},{}-{}", longitude, latitude, index));

        LocationFeature {
            kind: "Feature".to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: [longitude, latitude],
            },
            properties: FeatureProperties {
                id,
                name: name.to_string(),
                feature_type: present(&props.osm_value)
                    .or_else(|| present(&props.osm_key))
                    .map(str::to_string),
                full_address: Some(place.clone()),
                place_formatted: Some(place),
                maki: None,
                poi_category: present(&props.osm_value)
                    .map(|v| vec![v.to_string()])
                    .unwrap_or_default(),
            },
        }
    }
}

impl PhotonResponse {
    pub fn into_features(self) -> Vec<LocationFeature> {
        self.features
            .iter()
            .enumerate()
            .map(|(i, f)| f.normalize(i))
            .collect()
    }
}
