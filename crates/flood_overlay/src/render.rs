//! Rendering engine boundary.
//!
//! The overlay owns three GeoJSON sources. A [`RenderSink`] is the engine's
//! side: it can say whether a layer exists yet and replace a source's data
//! wholesale. Everything pushed is built fresh from the current state, so a
//! push is always a complete, consistent snapshot of one field.

use serde_json::{json, Map, Value};

use crate::classifier::label_for;
use crate::density::DensityPoint;
use crate::geojson::{Feature, FeatureCollection};
use crate::gradient::ColoredSegment;

pub const GRADIENT_SOURCE: &str = "flood-gradient-lines";
pub const NODE_FIELD_SOURCE: &str = "flood-heat-nodes";
pub const LINE_FIELD_SOURCE: &str = "flood-heat-lines";

pub const ALL_SOURCES: [&str; 3] = [GRADIENT_SOURCE, NODE_FIELD_SOURCE, LINE_FIELD_SOURCE];

/// `(floodVolume, width px)` breakpoints, non-decreasing in both columns.
pub const LINE_WIDTH_STOPS: [(f64, f64); 4] = [(0.0, 4.0), (10.0, 8.0), (25.0, 14.0), (50.0, 20.0)];

pub fn layer_id(source: &str) -> String {
    format!("{source}-layer")
}

/// Line width in pixels for a flood volume, linear between breakpoints and
/// clamped at both ends.
pub fn line_width_px(flood_volume: f64) -> f64 {
    let (first_v, first_w) = LINE_WIDTH_STOPS[0];
    if !(flood_volume > first_v) {
        return first_w;
    }
    for pair in LINE_WIDTH_STOPS.windows(2) {
        let ((v0, w0), (v1, w1)) = (pair[0], pair[1]);
        if flood_volume <= v1 {
            return w0 + (w1 - w0) * (flood_volume - v0) / (v1 - v0);
        }
    }
    LINE_WIDTH_STOPS[LINE_WIDTH_STOPS.len() - 1].1
}

/// The rendering engine as the overlay sees it.
pub trait RenderSink: Send + Sync + 'static {
    fn has_layer(&self, layer: &str) -> bool;
    fn replace_source_data(&mut self, source: &str, data: FeatureCollection);
}

fn number(value: f64) -> Value {
    json!(if value.is_finite() { value } else { 0.0 })
}

pub fn segments_collection(segments: &[ColoredSegment]) -> FeatureCollection {
    FeatureCollection::new(
        segments
            .iter()
            .map(|segment| {
                let mut props = Map::new();
                props.insert("color".into(), Value::String(segment.color.to_string()));
                props.insert("floodVolume".into(), number(segment.flood_volume));
                props.insert("lineWidth".into(), number(line_width_px(segment.flood_volume)));
                props.insert("vulnerability".into(), json!(label_for(segment.category)));
                if let Some(id) = &segment.start_node_id {
                    props.insert("startNode".into(), json!(id));
                }
                if let Some(id) = &segment.end_node_id {
                    props.insert("endNode".into(), json!(id));
                }
                Feature::line_string(&segment.vertices, props)
            })
            .collect(),
    )
}

/// Points at their current rendered position.
pub fn points_collection(points: &[DensityPoint]) -> FeatureCollection {
    FeatureCollection::new(
        points
            .iter()
            .map(|p| {
                let mut props = Map::new();
                props.insert("vulnerability".into(), json!(label_for(p.category)));
                props.insert("weight".into(), number(p.weight));
                props.insert("pulseMultiplier".into(), number(p.pulse_multiplier));
                if let Some(id) = &p.node_id {
                    props.insert("nodeId".into(), json!(id));
                }
                Feature::point(p.position, props)
            })
            .collect(),
    )
}
