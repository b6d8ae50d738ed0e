//! Vulnerability records produced by the hydraulic simulation.
//!
//! Records arrive as a JSON array using the simulation service's field names
//! (`Node_ID`, `Vulnerability_Category`, ...). They are read-only input: the
//! overlay never mutates or persists them.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::classifier::{classify, RiskCategory, RiskColors};
use crate::error::OverlayError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    #[serde(rename = "Node_ID", deserialize_with = "node_id_from_any")]
    pub node_id: String,
    #[serde(rename = "Vulnerability_Category")]
    pub category_label: String,
    #[serde(rename = "Total_Flood_Volume")]
    pub flood_volume: f64,
    #[serde(rename = "Maximum_Rate", default)]
    pub max_rate: f64,
    #[serde(rename = "Hours_Flooded", default)]
    pub hours_flooded: f64,
    #[serde(rename = "Time_Before_Overflow", default)]
    pub time_before_overflow: f64,
}

impl VulnerabilityRecord {
    pub fn new(node_id: impl Into<String>, category_label: impl Into<String>, flood_volume: f64) -> Self {
        Self {
            node_id: node_id.into(),
            category_label: category_label.into(),
            flood_volume,
            max_rate: 0.0,
            hours_flooded: 0.0,
            time_before_overflow: 0.0,
        }
    }

    pub fn category(&self) -> Option<RiskCategory> {
        RiskCategory::from_label(&self.category_label)
    }

    pub fn colors(&self) -> RiskColors {
        classify(&self.category_label)
    }

    /// A node floods when its simulated volume is strictly positive.
    pub fn is_flooded(&self) -> bool {
        self.flood_volume > 0.0
    }
}

/// Node ids show up as strings or numbers depending on the simulation export.
#[derive(Deserialize)]
#[serde(untagged)]
enum NodeIdRepr {
    Text(String),
    Int(i64),
    Float(f64),
}

fn node_id_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match NodeIdRepr::deserialize(deserializer)? {
        NodeIdRepr::Text(s) => s,
        NodeIdRepr::Int(i) => i.to_string(),
        NodeIdRepr::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        NodeIdRepr::Float(f) => f.to_string(),
    })
}

pub fn parse_records(json: &str) -> Result<Vec<VulnerabilityRecord>, OverlayError> {
    Ok(serde_json::from_str(json)?)
}

/// The flooded set: records with `flood_volume > 0`, one per node id.
///
/// Node ids should be unique per simulation run. When they are not, the last
/// record wins and the rest are dropped with a warning. The returned order is
/// the input order of the surviving records; nearest-neighbor tie-breaking
/// downstream depends on it.
pub fn flooded_set(records: &[VulnerabilityRecord]) -> Vec<&VulnerabilityRecord> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    let mut unique: Vec<&VulnerabilityRecord> = Vec::with_capacity(records.len());
    let mut duplicates = 0usize;
    for record in records.iter().rev() {
        if seen.insert(record.node_id.as_str()) {
            unique.push(record);
        } else {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warn!(
            "Flood overlay: {} duplicate vulnerability records ignored (last record per node wins)",
            duplicates
        );
    }
    unique.reverse();
    unique.retain(|r| r.is_flooded());
    unique
}
