//! Density field assembly.
//!
//! Two point fields feed the heatmap: one point per flooded node, weighted by
//! risk category, and points sampled along the gradient segments. They stay
//! separate because the renderer applies a different radius and intensity
//! curve to each, letting node hot spots dominate the diffuse line glow.
//! Line points that land on top of a node point are dropped.

use std::f64::consts::TAU;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::classifier::{node_weight_for, RiskCategory};
use crate::error::OverlayError;
use crate::geo::LngLat;
use crate::point_index::PointIndex;
use crate::records::VulnerabilityRecord;
use crate::topology::NodeCoordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Node,
    Line,
}

/// One heatmap point.
///
/// `phase`, `wobble_angle` and `wobble_radius` are drawn once at creation and
/// never change. `position` and `pulse_multiplier` are rewritten by every
/// animation tick from those fields and the clock; nothing reads them back
/// into the computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityPoint {
    /// Where the point sits when not wobbling.
    pub base: LngLat,
    /// Rendered position for the current frame.
    pub position: LngLat,
    pub source_kind: SourceKind,
    pub node_id: Option<String>,
    pub category: Option<RiskCategory>,
    pub weight: f64,
    pub phase: f64,
    pub wobble_angle: f64,
    pub wobble_radius: f64,
    pub pulse_multiplier: f64,
}

impl DensityPoint {
    pub fn new<R: Rng + ?Sized>(
        base: LngLat,
        source_kind: SourceKind,
        category: Option<RiskCategory>,
        weight: f64,
        max_wobble_radius: f64,
        rng: &mut R,
    ) -> Self {
        let phase = rng.gen_range(0.0..TAU);
        let wobble_angle = rng.gen_range(0.0..TAU);
        let wobble_radius = if max_wobble_radius > 0.0 {
            rng.gen_range(0.0..=max_wobble_radius)
        } else {
            0.0
        };
        Self {
            base,
            position: base,
            source_kind,
            node_id: None,
            category,
            weight,
            phase,
            wobble_angle,
            wobble_radius,
            pulse_multiplier: 1.0,
        }
    }
}

/// The node and line fields, always replaced as a pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DensityFields {
    pub nodes: Vec<DensityPoint>,
    pub lines: Vec<DensityPoint>,
}

impl DensityFields {
    pub fn len(&self) -> usize {
        self.nodes.len() + self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.lines.is_empty()
    }
}

/// One point per flooded record with a known coordinate.
///
/// Records whose node is missing from the topology are skipped and logged;
/// their ids are returned alongside the points.
pub fn build_node_points<R: Rng + ?Sized>(
    flooded: &[&VulnerabilityRecord],
    nodes: &NodeCoordinates,
    max_wobble_radius: f64,
    rng: &mut R,
) -> (Vec<DensityPoint>, Vec<String>) {
    let mut points = Vec::with_capacity(flooded.len());
    let mut missing = Vec::new();
    for record in flooded {
        let Some(position) = nodes.get(&record.node_id) else {
            warn!(
                "Flood overlay: {}, record skipped",
                OverlayError::MissingCoordinate {
                    node_id: record.node_id.clone()
                }
            );
            missing.push(record.node_id.clone());
            continue;
        };
        let category = record.category();
        let mut point = DensityPoint::new(
            position,
            SourceKind::Node,
            category,
            node_weight_for(category),
            max_wobble_radius,
            rng,
        );
        point.node_id = Some(record.node_id.clone());
        points.push(point);
    }
    (points, missing)
}

/// Pair node points with line points, dropping line points closer than
/// `exclusion_radius` to any node point.
pub fn assemble_fields(
    node_points: Vec<DensityPoint>,
    line_points: impl IntoIterator<Item = DensityPoint>,
    exclusion_radius: f64,
) -> DensityFields {
    let index = PointIndex::from_points(node_points.iter().map(|p| p.base), exclusion_radius);
    let lines = line_points
        .into_iter()
        .filter(|p| !index.any_within(p.base, exclusion_radius))
        .collect();
    DensityFields {
        nodes: node_points,
        lines,
    }
}
