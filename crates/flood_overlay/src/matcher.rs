//! Node-to-pipe matching.
//!
//! A pipe joins the flood overlay only when *both* of its ends lie within the
//! match radius of a flooded node. One flooded node near one end is not
//! enough: that would paint a single high-risk node's color onto every pipe
//! that happens to start next to it.
//!
//! When several flooded nodes are within range of an end, the closest wins.
//! Exact distance ties keep the candidate that comes first in the flooded
//! set's order; simulation output does not produce exact ties in practice,
//! so this order dependence is accepted as-is.

use crate::geo::{distance, LngLat};
use crate::gradient::{Endpoint, GradientSpan};
use crate::records::VulnerabilityRecord;
use crate::topology::{NodeCoordinates, PipePolyline};

/// A flooded node matched to one end of a pipe.
#[derive(Debug, Clone, Copy)]
pub struct EndpointMatch<'a> {
    pub record: &'a VulnerabilityRecord,
    pub position: LngLat,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PipeMatch<'a> {
    pub pipe: &'a PipePolyline,
    pub start: Option<EndpointMatch<'a>>,
    pub end: Option<EndpointMatch<'a>>,
}

impl<'a> PipeMatch<'a> {
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// The colored span for this pipe, or `None` unless both ends matched.
    pub fn to_span(&self) -> Option<GradientSpan> {
        let (start, end) = (self.start?, self.end?);
        Some(GradientSpan {
            start: Endpoint::from_record(start.record),
            end: Endpoint::from_record(end.record),
            vertices: self.pipe.vertices().to_vec(),
        })
    }
}

/// Closest flooded node within `radius` of `point`. Records without a known
/// coordinate are ignored here; the density assembler reports them.
pub fn nearest_flooded<'a>(
    point: LngLat,
    flooded: &[&'a VulnerabilityRecord],
    nodes: &NodeCoordinates,
    radius: f64,
) -> Option<EndpointMatch<'a>> {
    let mut best: Option<EndpointMatch<'a>> = None;
    for &record in flooded {
        let Some(position) = nodes.get(&record.node_id) else {
            continue;
        };
        let d = distance(point, position);
        if d > radius {
            continue;
        }
        // Strict comparison keeps the earliest candidate on ties.
        if best.map_or(true, |b| d < b.distance) {
            best = Some(EndpointMatch {
                record,
                position,
                distance: d,
            });
        }
    }
    best
}

pub fn match_pipe<'a>(
    pipe: &'a PipePolyline,
    flooded: &[&'a VulnerabilityRecord],
    nodes: &NodeCoordinates,
    radius: f64,
) -> PipeMatch<'a> {
    PipeMatch {
        pipe,
        start: nearest_flooded(pipe.first(), flooded, nodes, radius),
        end: nearest_flooded(pipe.last(), flooded, nodes, radius),
    }
}
