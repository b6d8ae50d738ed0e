//! Orphan connector.
//!
//! A high-risk node that no matched pipe touches would otherwise show up as
//! an isolated hot spot with no flow path. For each such node, link it to its
//! nearest flooded neighbor (any category except no-risk) with a straight
//! two-vertex span. A node with no qualifying neighbor anywhere in the
//! network stays unconnected.
//!
//! Coverage is judged against pipe-derived segments only. Every uncovered
//! high-risk node gets its own link even when another orphan already linked
//! to it, so two orphans that pick each other produce two links.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::classifier::RiskCategory;
use crate::geo::{distance, LngLat};
use crate::gradient::{Endpoint, GradientSpan};
use crate::records::VulnerabilityRecord;
use crate::topology::NodeCoordinates;

/// Nearest flooded, non-no-risk node to `source` other than itself. Ties keep
/// the earliest candidate in the flooded set's order.
fn nearest_neighbor<'a>(
    source: &VulnerabilityRecord,
    origin: LngLat,
    flooded: &[&'a VulnerabilityRecord],
    nodes: &NodeCoordinates,
) -> Option<(&'a VulnerabilityRecord, LngLat)> {
    let mut best: Option<(&'a VulnerabilityRecord, LngLat, f64)> = None;
    for &candidate in flooded {
        if candidate.node_id == source.node_id
            || candidate.category() == Some(RiskCategory::NoRisk)
        {
            continue;
        }
        let Some(position) = nodes.get(&candidate.node_id) else {
            continue;
        };
        let d = distance(origin, position);
        if best.map_or(true, |(_, _, bd)| d < bd) {
            best = Some((candidate, position, d));
        }
    }
    best.map(|(record, position, _)| (record, position))
}

/// Connector spans for every uncovered high-risk node in `flooded`.
///
/// `connected` holds the node ids already covered by pipe-derived segments.
pub fn find_orphan_links(
    flooded: &[&VulnerabilityRecord],
    nodes: &NodeCoordinates,
    connected: &HashSet<String>,
) -> Vec<GradientSpan> {
    let mut links = Vec::new();

    for &source in flooded {
        if source.category() != Some(RiskCategory::High) || connected.contains(&source.node_id) {
            continue;
        }
        let Some(origin) = nodes.get(&source.node_id) else {
            continue;
        };
        match nearest_neighbor(source, origin, flooded, nodes) {
            Some((neighbor, position)) => {
                links.push(GradientSpan {
                    start: Endpoint::from_record(source),
                    end: Endpoint::from_record(neighbor),
                    vertices: vec![origin, position],
                });
            }
            None => debug!(
                "Flood overlay: high-risk node {} has no flooded neighbor, left unconnected",
                source.node_id
            ),
        }
    }
    links
}
