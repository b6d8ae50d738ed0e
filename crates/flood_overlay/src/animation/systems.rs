//! Bevy events and systems that drive the overlay from the host app.

use bevy::prelude::*;

use crate::config::OverlayConfig;
use crate::overlay_rng::OverlayRng;
use crate::records::VulnerabilityRecord;
use crate::topology::{NodeCoordinates, PipeFetch};

use super::controller::FloodOverlay;

/// Show the overlay for a new simulation result.
#[derive(Event, Debug, Clone)]
pub struct EnableFloodOverlay(pub Vec<VulnerabilityRecord>);

/// Hide the overlay and stop the animation.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct DisableFloodOverlay;

/// Records waiting for the pipe network before they can be assembled.
#[derive(Resource, Default)]
pub struct PendingOverlay(pub Option<Vec<VulnerabilityRecord>>);

/// Disables apply before enables, so an enable sent in the same frame as a
/// disable wins. Of several enables only the last one is kept.
pub fn apply_overlay_requests(
    mut enables: EventReader<EnableFloodOverlay>,
    mut disables: EventReader<DisableFloodOverlay>,
    mut pending: ResMut<PendingOverlay>,
    mut overlay: ResMut<FloodOverlay>,
) {
    if disables.read().count() > 0 {
        pending.0 = None;
        overlay.disable();
    }
    if let Some(EnableFloodOverlay(records)) = enables.read().last() {
        pending.0 = Some(records.clone());
    }
}

/// Build and start a pending overlay once the pipe fetch has resolved,
/// successfully or not.
pub fn assemble_pending_overlay(
    time: Res<Time>,
    fetch: Res<PipeFetch>,
    nodes: Res<NodeCoordinates>,
    mut rng: ResMut<OverlayRng>,
    mut pending: ResMut<PendingOverlay>,
    mut overlay: ResMut<FloodOverlay>,
) {
    if !fetch.is_resolved() {
        return;
    }
    let Some(records) = pending.0.take() else {
        return;
    };
    let report = overlay.enable(&records, &nodes, fetch.pipes(), &mut rng.0, time.elapsed());
    if !report.missing_coordinates.is_empty() {
        warn!(
            "Flood overlay: {} flooded nodes have no coordinates",
            report.missing_coordinates.len()
        );
    }
}

pub fn drive_flood_animation(time: Res<Time>, mut overlay: ResMut<FloodOverlay>) {
    if let Some(handle) = overlay.scheduler_mut().take_due() {
        overlay.on_tick(handle, time.elapsed());
    }
}

/// Keeps the controller's copy of the tunables in step with the resource.
pub fn sync_overlay_config(config: Res<OverlayConfig>, mut overlay: ResMut<FloodOverlay>) {
    if config.is_changed() && !config.is_added() {
        overlay.set_config(&config);
    }
}
