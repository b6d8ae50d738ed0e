//! Gradient segment builder.
//!
//! Renderers draw each line feature in a single solid color, so a color
//! transition along a pipe is approximated by cutting it into short pieces,
//! each colored by linear interpolation at its midpoint's fractional arc
//! length. Two-vertex pipes are cut into `subdivisions` equal pieces;
//! longer polylines are cut at their own vertices.

use crate::classifier::{fill_for, RiskCategory, Rgb};
use crate::geo::{cumulative_lengths, lerp_point, LngLat};
use crate::records::VulnerabilityRecord;

/// One classified end of a span.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub node_id: String,
    pub category: Option<RiskCategory>,
    pub color: Rgb,
    pub flood_volume: f64,
}

impl Endpoint {
    pub fn from_record(record: &VulnerabilityRecord) -> Self {
        Self {
            node_id: record.node_id.clone(),
            category: record.category(),
            color: record.colors().fill,
            flood_volume: record.flood_volume,
        }
    }
}

/// Two classified endpoints joined by a polyline: a matched pipe or an
/// orphan connector.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientSpan {
    pub start: Endpoint,
    pub end: Endpoint,
    pub vertices: Vec<LngLat>,
}

impl GradientSpan {
    pub fn mean_flood_volume(&self) -> f64 {
        (self.start.flood_volume + self.end.flood_volume) / 2.0
    }
}

/// A single-colored line piece ready for rendering and line sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredSegment {
    pub color: Rgb,
    pub flood_volume: f64,
    /// Category of the endpoint this piece is closer to.
    pub category: Option<RiskCategory>,
    pub start_node_id: Option<String>,
    pub end_node_id: Option<String>,
    pub vertices: Vec<LngLat>,
}

impl ColoredSegment {
    /// A standalone segment not tied to any network node.
    pub fn new(color: Rgb, category: Option<RiskCategory>, flood_volume: f64, vertices: Vec<LngLat>) -> Self {
        Self {
            color,
            flood_volume,
            category,
            start_node_id: None,
            end_node_id: None,
            vertices,
        }
    }
}

/// Split a span into colored segments.
///
/// Identical endpoint colors yield the whole polyline as one segment.
/// Otherwise every piece's color is interpolated between the two endpoint
/// colors only; no third color ever enters a span.
pub fn build_gradient_segments(span: &GradientSpan, subdivisions: usize) -> Vec<ColoredSegment> {
    let volume = span.mean_flood_volume();
    let piece = |vertices: Vec<LngLat>, color: Rgb, category: Option<RiskCategory>| ColoredSegment {
        color,
        flood_volume: volume,
        category,
        start_node_id: Some(span.start.node_id.clone()),
        end_node_id: Some(span.end.node_id.clone()),
        vertices,
    };

    if span.vertices.len() < 2 {
        return Vec::new();
    }

    if span.start.color == span.end.color {
        let category = span.start.category.max(span.end.category);
        return vec![piece(span.vertices.clone(), span.start.color, category)];
    }

    let shade = |t: f64| {
        let category = if t < 0.5 {
            span.start.category
        } else {
            span.end.category
        };
        (span.start.color.lerp(span.end.color, t), category)
    };

    if span.vertices.len() == 2 {
        let n = subdivisions.max(1);
        let (a, b) = (span.vertices[0], span.vertices[1]);
        return (0..n)
            .map(|i| {
                let t0 = i as f64 / n as f64;
                let t1 = (i + 1) as f64 / n as f64;
                let (color, category) = shade((t0 + t1) / 2.0);
                piece(vec![lerp_point(a, b, t0), lerp_point(a, b, t1)], color, category)
            })
            .collect();
    }

    let cumulative = cumulative_lengths(&span.vertices);
    let total = cumulative[cumulative.len() - 1];
    let edges = span.vertices.len() - 1;
    (0..edges)
        .map(|i| {
            let mid = if total > 0.0 {
                (cumulative[i] + cumulative[i + 1]) / 2.0 / total
            } else {
                (i as f64 + 0.5) / edges as f64
            };
            let (color, category) = shade(mid);
            piece(vec![span.vertices[i], span.vertices[i + 1]], color, category)
        })
        .collect()
}

/// Endpoint colored with its category's fill, for spans built by hand.
pub fn endpoint(node_id: impl Into<String>, category: Option<RiskCategory>, flood_volume: f64) -> Endpoint {
    Endpoint {
        node_id: node_id.into(),
        category,
        color: fill_for(category),
        flood_volume,
    }
}
