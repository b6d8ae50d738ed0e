//! Minimal GeoJSON model.
//!
//! Covers what the overlay reads (Point, LineString and MultiLineString
//! features from the topology store) and what it writes (the three feature
//! collections handed to the renderer). Geometry is kept as a raw JSON value
//! on [`Feature`] so a collection with unsupported geometry types still
//! parses; unsupported features are skipped one by one.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::OverlayError;
use crate::geo::LngLat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionKind {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    pub kind: CollectionKind,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub kind: FeatureKind,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Geometry types the overlay understands. Extra ordinates (elevation) are
/// tolerated on input and dropped by [`Geometry::lines`]/[`Geometry::point`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
}

fn lng_lat(ordinates: &[f64]) -> Option<LngLat> {
    match ordinates {
        [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some([*lng, *lat]),
        _ => None,
    }
}

impl Geometry {
    pub fn point(&self) -> Option<LngLat> {
        match self {
            Geometry::Point { coordinates } => lng_lat(coordinates),
            _ => None,
        }
    }

    /// Vertices of a line geometry. MultiLineString parts are joined in order.
    pub fn line_vertices(&self) -> Option<Vec<LngLat>> {
        match self {
            Geometry::LineString { coordinates } => {
                coordinates.iter().map(|c| lng_lat(c)).collect()
            }
            Geometry::MultiLineString { coordinates } => coordinates
                .iter()
                .flatten()
                .map(|c| lng_lat(c))
                .collect(),
            Geometry::Point { .. } => None,
        }
    }
}

impl Feature {
    pub fn point(position: LngLat, properties: Map<String, Value>) -> Self {
        Self {
            kind: FeatureKind::Feature,
            geometry: Some(json!({ "type": "Point", "coordinates": position })),
            properties: Some(properties),
        }
    }

    pub fn line_string(vertices: &[LngLat], properties: Map<String, Value>) -> Self {
        Self {
            kind: FeatureKind::Feature,
            geometry: Some(json!({ "type": "LineString", "coordinates": vertices })),
            properties: Some(properties),
        }
    }

    /// Typed geometry, or `None` when missing or of an unsupported type.
    pub fn geometry(&self) -> Option<Geometry> {
        let value = self.geometry.as_ref()?;
        Geometry::deserialize(value).ok()
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    /// First of `keys` present as a non-empty string or a number.
    pub fn id_property(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.property(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: CollectionKind::FeatureCollection,
            features,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, OverlayError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
