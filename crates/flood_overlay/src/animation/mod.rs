//! Animation loop for the flood overlay.
//!
//! `state` holds the owned [`AnimationState`] and the pure `tick` function,
//! `pulse` the per-point wave, `scheduler` the tick handle abstraction, and
//! `controller` the Stopped/Running machine that ties them to a render sink.
//! `systems` drives the controller from Bevy.

pub mod controller;
pub mod pulse;
pub mod scheduler;
pub mod state;
pub mod systems;

pub use controller::FloodOverlay;
pub use pulse::{pulse_multiplier, wobble_position};
pub use scheduler::{FrameScheduler, Scheduler, TickHandle};
pub use state::{tick, AnimationState};
pub use systems::{
    apply_overlay_requests, assemble_pending_overlay, drive_flood_animation, sync_overlay_config,
    DisableFloodOverlay, EnableFloodOverlay, PendingOverlay,
};
