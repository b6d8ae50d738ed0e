//! One-shot overlay assembly.
//!
//! Runs the pure stages in order (flooded set, pipe matching, gradients,
//! orphan links, sampling, density fields) and returns everything the
//! animation loop needs. Nothing here touches shared state, so a rebuild for
//! a new simulation result can run any time and simply replace the old one.

use std::collections::HashSet;

use bevy::prelude::*;
use rand::Rng;

use crate::config::OverlayConfig;
use crate::density::{assemble_fields, build_node_points, DensityFields};
use crate::gradient::{build_gradient_segments, ColoredSegment};
use crate::matcher::match_pipe;
use crate::orphan::find_orphan_links;
use crate::records::{flooded_set, VulnerabilityRecord};
use crate::sampler::{sample_segment, SamplingParams};
use crate::topology::{NodeCoordinates, PipePolyline};

/// What the build kept and what it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub flooded_nodes: usize,
    /// Flooded node ids absent from the topology.
    pub missing_coordinates: Vec<String>,
    pub matched_pipes: usize,
    pub orphan_links: usize,
    pub segments: usize,
    pub node_points: usize,
    pub line_points: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayBuild {
    pub segments: Vec<ColoredSegment>,
    /// Node ids touched by a pipe-derived or orphan segment.
    pub connected_nodes: HashSet<String>,
    pub fields: DensityFields,
    pub report: BuildReport,
}

/// Build segments and density fields for one simulation result.
///
/// With `pipes` set to `None` the network is unknown: matching, orphan links
/// and line sampling are skipped and only the node field is built.
pub fn build_overlay<R: Rng + ?Sized>(
    records: &[VulnerabilityRecord],
    nodes: &NodeCoordinates,
    pipes: Option<&[PipePolyline]>,
    config: &OverlayConfig,
    rng: &mut R,
) -> OverlayBuild {
    let flooded = flooded_set(records);
    let mut report = BuildReport {
        flooded_nodes: flooded.len(),
        ..Default::default()
    };

    let mut segments = Vec::new();
    let mut connected_nodes = HashSet::new();
    if let Some(pipes) = pipes {
        for pipe in pipes {
            let Some(span) =
                match_pipe(pipe, &flooded, nodes, config.match_radius_deg).to_span()
            else {
                continue;
            };
            report.matched_pipes += 1;
            connected_nodes.insert(span.start.node_id.clone());
            connected_nodes.insert(span.end.node_id.clone());
            segments.extend(build_gradient_segments(&span, config.gradient_subdivisions));
        }

        let links = find_orphan_links(&flooded, nodes, &connected_nodes);
        report.orphan_links = links.len();
        for link in &links {
            connected_nodes.insert(link.start.node_id.clone());
            connected_nodes.insert(link.end.node_id.clone());
            segments.extend(build_gradient_segments(link, config.gradient_subdivisions));
        }
    }

    let (node_points, missing) =
        build_node_points(&flooded, nodes, config.max_wobble_radius_deg, rng);
    report.missing_coordinates = missing;

    let params = SamplingParams::from_config(config);
    let mut line_points = Vec::new();
    for segment in &segments {
        line_points.extend(sample_segment(segment, &params, rng));
    }
    let fields = assemble_fields(node_points, line_points, config.node_exclusion_radius_deg);

    report.segments = segments.len();
    report.node_points = fields.nodes.len();
    report.line_points = fields.lines.len();
    debug!(
        "Flood overlay build: {} flooded, {} pipes matched, {} orphan links, {} node points, {} line points",
        report.flooded_nodes,
        report.matched_pipes,
        report.orphan_links,
        report.node_points,
        report.line_points
    );

    OverlayBuild {
        segments,
        connected_nodes,
        fields,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RiskCategory;
    use crate::overlay_rng::OverlayRng;

    fn network() -> (Vec<VulnerabilityRecord>, NodeCoordinates, Vec<PipePolyline>) {
        let records = vec![
            VulnerabilityRecord::new("N1", "High Risk", 20.0),
            VulnerabilityRecord::new("N2", "Medium Risk", 5.0),
            VulnerabilityRecord::new("N3", "No Risk", 0.0),
        ];
        let mut nodes = NodeCoordinates::default();
        nodes.insert("N1", [0.0, 0.0]);
        nodes.insert("N2", [0.0, 0.001]);
        nodes.insert("N3", [0.0, 0.002]);
        let pipes = vec![
            PipePolyline::new("P1", vec![[0.0, 0.0], [0.0, 0.001]]).unwrap(),
            PipePolyline::new("P2", vec![[0.0, 0.001], [0.0, 0.002]]).unwrap(),
        ];
        (records, nodes, pipes)
    }

    fn build_with(
        records: &[VulnerabilityRecord],
        nodes: &NodeCoordinates,
        pipes: Option<&[PipePolyline]>,
    ) -> OverlayBuild {
        let mut rng = OverlayRng::default();
        build_overlay(records, nodes, pipes, &OverlayConfig::default(), &mut rng.0)
    }

    #[test]
    fn test_build_matches_pipe_and_skips_dry_node() {
        let (records, nodes, pipes) = network();
        let build = build_with(&records, &nodes, Some(pipes.as_slice()));
        assert_eq!(build.report.flooded_nodes, 2);
        assert_eq!(build.report.matched_pipes, 1);
        assert_eq!(build.report.orphan_links, 0);
        assert_eq!(build.segments.len(), 10);
        assert!(build.connected_nodes.contains("N1"));
        assert!(!build.connected_nodes.contains("N3"));
        assert_eq!(build.fields.nodes.len(), 2);
        assert!(!build.fields.lines.is_empty());
        assert_eq!(build.report.line_points, build.fields.lines.len());
    }

    #[test]
    fn test_missing_coordinate_is_reported() {
        let (mut records, nodes, pipes) = network();
        records.push(VulnerabilityRecord::new("ghost", "High", 3.0));
        let build = build_with(&records, &nodes, Some(pipes.as_slice()));
        assert_eq!(build.report.missing_coordinates, vec!["ghost".to_string()]);
        assert_eq!(build.fields.nodes.len(), 2);
    }

    #[test]
    fn test_unavailable_network_builds_node_field_only() {
        let (records, nodes, _) = network();
        let build = build_with(&records, &nodes, None);
        assert_eq!(build.report.matched_pipes, 0);
        assert_eq!(build.report.orphan_links, 0);
        assert!(build.segments.is_empty());
        assert!(build.connected_nodes.is_empty());
        assert_eq!(build.fields.nodes.len(), 2);
        assert!(build.fields.lines.is_empty());
        assert_eq!(build.report.line_points, 0);
    }

    #[test]
    fn test_known_network_without_matches_falls_back_to_orphan_links() {
        let (records, nodes, _) = network();
        let build = build_with(&records, &nodes, Some(&[][..]));
        assert_eq!(build.report.matched_pipes, 0);
        assert_eq!(build.report.orphan_links, 1);
        assert!(build
            .segments
            .iter()
            .all(|s| s.start_node_id.as_deref() == Some("N1")));
        assert_eq!(build.segments[0].category, Some(RiskCategory::High));
        assert!(!build.fields.lines.is_empty());
    }

    #[test]
    fn test_empty_records_build_nothing() {
        let (_, nodes, pipes) = network();
        let build = build_with(&[], &nodes, Some(pipes.as_slice()));
        assert!(build.segments.is_empty());
        assert!(build.fields.is_empty());
    }

    #[test]
    fn test_same_seed_same_build() {
        let (records, nodes, pipes) = network();
        let config = OverlayConfig::default();
        let pipes = Some(pipes.as_slice());
        let a = build_overlay(&records, &nodes, pipes, &config, &mut OverlayRng::from_seed_u64(7).0);
        let b = build_overlay(&records, &nodes, pipes, &config, &mut OverlayRng::from_seed_u64(7).0);
        assert_eq!(a.fields, b.fields);
    }
}
