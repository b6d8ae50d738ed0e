//! Overlay tunables.
//!
//! Distances are in coordinate degrees. The metric values they stand for are
//! converted with [`METERS_PER_DEGREE`], which is accurate enough at the
//! scale of a single drainage network.
//!
//! [`OverlayConfig`] gathers every constant below into a serde resource so a
//! deployment can override any subset from a JSON file without recompiling.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::OverlayError;
use crate::retry::RetryPolicy;

/// Degrees-to-meters factor used for all threshold conversions.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Radius around a pipe end within which a flooded node is matched (~90 m).
pub const NODE_MATCH_RADIUS_DEG: f64 = 0.0008;

/// Number of equal sub-segments a two-vertex pipe is split into when its end
/// colors differ.
pub const GRADIENT_SUBDIVISIONS: usize = 10;

/// Line samples per reference length before the risk multiplier is applied.
pub const SAMPLES_PER_REFERENCE: f64 = 3.0;

/// Reference length for line sampling (~55 m).
pub const SAMPLE_REFERENCE_LENGTH_DEG: f64 = 0.0005;

/// Upper bound of the per-point wobble radius (~9 m).
pub const MAX_WOBBLE_RADIUS_DEG: f64 = 0.00008;

/// Line points closer than this to a node point are dropped (~9 m).
pub const NODE_EXCLUSION_RADIUS_DEG: f64 = 0.00008;

/// Pulse amplitude; the multiplier swings within `[1 - amount, 1]`.
pub const PULSE_AMOUNT: f64 = 0.35;

/// Pulse frequency in Hz.
pub const PULSE_SPEED_HZ: f64 = 0.3;

/// Animation throttle.
pub const MAX_UPDATES_PER_SECOND: f64 = 20.0;

/// Pulse animation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseParams {
    pub amount: f64,
    pub speed_hz: f64,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            amount: PULSE_AMOUNT,
            speed_hz: PULSE_SPEED_HZ,
        }
    }
}

/// Every overlay tunable in one place. Missing JSON fields keep their defaults.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub match_radius_deg: f64,
    pub gradient_subdivisions: usize,
    pub samples_per_reference: f64,
    pub sample_reference_length_deg: f64,
    pub max_wobble_radius_deg: f64,
    pub node_exclusion_radius_deg: f64,
    pub pulse: PulseParams,
    pub max_updates_per_second: f64,
    /// Readiness retries when a render layer is missing at push time.
    pub render_retry: RetryPolicy,
    /// Retries for a failed pipe network fetch.
    pub topology_retry: RetryPolicy,
    /// Seed for per-point jitter. `None` uses the default seed.
    pub seed: Option<u64>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            match_radius_deg: NODE_MATCH_RADIUS_DEG,
            gradient_subdivisions: GRADIENT_SUBDIVISIONS,
            samples_per_reference: SAMPLES_PER_REFERENCE,
            sample_reference_length_deg: SAMPLE_REFERENCE_LENGTH_DEG,
            max_wobble_radius_deg: MAX_WOBBLE_RADIUS_DEG,
            node_exclusion_radius_deg: NODE_EXCLUSION_RADIUS_DEG,
            pulse: PulseParams::default(),
            max_updates_per_second: MAX_UPDATES_PER_SECOND,
            render_retry: RetryPolicy {
                max_attempts: 10,
                delay_ms: 100,
            },
            topology_retry: RetryPolicy {
                max_attempts: 3,
                delay_ms: 500,
            },
            seed: None,
        }
    }
}

impl OverlayConfig {
    pub fn from_json_str(text: &str) -> Result<Self, OverlayError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, OverlayError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Minimum spacing between two animation ticks. Zero disables throttling.
    pub fn tick_interval(&self) -> Duration {
        if self.max_updates_per_second > 0.0 && self.max_updates_per_second.is_finite() {
            Duration::from_secs_f64(1.0 / self.max_updates_per_second)
        } else {
            Duration::ZERO
        }
    }
}
