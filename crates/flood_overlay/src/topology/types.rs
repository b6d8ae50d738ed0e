//! Topology data types and their GeoJSON readers.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::error::OverlayError;
use crate::geo::LngLat;
use crate::geojson::FeatureCollection;

/// Property keys tried, in order, for a pipe's stable id.
pub const PIPE_ID_KEYS: [&str; 3] = ["Name", "name", "id"];

/// Property keys tried, in order, for a node's stable id.
pub const NODE_ID_KEYS: [&str; 4] = ["id", "Name", "name", "node_id"];

#[derive(Debug, Clone, PartialEq)]
pub struct NodeCoordinate {
    pub id: String,
    pub position: LngLat,
}

/// A pipe as a polyline with at least two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct PipePolyline {
    pub id: String,
    vertices: Vec<LngLat>,
}

impl PipePolyline {
    pub fn new(id: impl Into<String>, vertices: Vec<LngLat>) -> Result<Self, OverlayError> {
        let id = id.into();
        if vertices.len() < 2 {
            return Err(OverlayError::InvalidGeometry(format!(
                "pipe {id} has {} vertices, need at least 2",
                vertices.len()
            )));
        }
        Ok(Self { id, vertices })
    }

    pub fn vertices(&self) -> &[LngLat] {
        &self.vertices
    }

    pub fn first(&self) -> LngLat {
        self.vertices[0]
    }

    pub fn last(&self) -> LngLat {
        self.vertices[self.vertices.len() - 1]
    }
}

/// Node id -> position lookup for every inlet and drain in the network.
#[derive(Resource, Debug, Clone, Default)]
pub struct NodeCoordinates {
    positions: HashMap<String, LngLat>,
}

impl NodeCoordinates {
    /// Later entries overwrite earlier ones with the same id.
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeCoordinate>) -> Self {
        let mut out = Self::default();
        out.extend(nodes);
        out
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = NodeCoordinate>) {
        for node in nodes {
            self.positions.insert(node.id, node.position);
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, position: LngLat) {
        self.positions.insert(id.into(), position);
    }

    pub fn get(&self, id: &str) -> Option<LngLat> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Read pipe polylines. Features without usable line geometry, or with fewer
/// than two vertices, are skipped with a warning. Pipes without an id
/// property are named after their feature index.
pub fn pipes_from_collection(collection: &FeatureCollection) -> Vec<PipePolyline> {
    let mut pipes = Vec::with_capacity(collection.len());
    for (index, feature) in collection.features.iter().enumerate() {
        let id = feature
            .id_property(&PIPE_ID_KEYS)
            .unwrap_or_else(|| format!("pipe-{index}"));
        let Some(vertices) = feature.geometry().and_then(|g| g.line_vertices()) else {
            warn!("Flood overlay: pipe {} has no usable line geometry, skipped", id);
            continue;
        };
        match PipePolyline::new(id, vertices) {
            Ok(pipe) => pipes.push(pipe),
            Err(e) => warn!("Flood overlay: {}, skipped", e),
        }
    }
    pipes
}

/// Read node points. `id_key` overrides the default [`NODE_ID_KEYS`].
/// Features without an id or a point geometry are skipped.
pub fn nodes_from_collection(
    collection: &FeatureCollection,
    id_key: Option<&str>,
) -> Vec<NodeCoordinate> {
    let keys: Vec<&str> = match id_key {
        Some(key) => vec![key],
        None => NODE_ID_KEYS.to_vec(),
    };
    let mut nodes = Vec::with_capacity(collection.len());
    let mut skipped = 0usize;
    for feature in &collection.features {
        let id = feature.id_property(&keys);
        let position = feature.geometry().and_then(|g| g.point());
        match (id, position) {
            (Some(id), Some(position)) => nodes.push(NodeCoordinate { id, position }),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(
            "Flood overlay: {} node features without an id or point geometry skipped",
            skipped
        );
    }
    nodes
}
