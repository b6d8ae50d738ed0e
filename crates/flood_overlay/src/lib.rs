use std::sync::Arc;

use bevy::prelude::*;

pub mod animation;
pub mod classifier;
pub mod config;
pub mod density;
pub mod error;
pub mod geo;
pub mod geojson;
pub mod gradient;
pub mod matcher;
pub mod orphan;
pub mod overlay_rng;
pub mod pipeline;
pub mod point_index;
pub mod records;
pub mod render;
pub mod retry;
pub mod sampler;
pub mod topology;

#[cfg(test)]
pub mod test_harness;

pub use animation::{DisableFloodOverlay, EnableFloodOverlay, FloodOverlay};
pub use config::OverlayConfig;
pub use error::OverlayError;
pub use overlay_rng::OverlayRng;
pub use records::VulnerabilityRecord;
pub use render::RenderSink;
pub use topology::{NodeCoordinates, PipeFetch, TopologyProvider, TopologySource};

/// Builds a fresh render sink when the plugin is added to an app.
pub type SinkFactory = Arc<dyn Fn() -> Box<dyn RenderSink> + Send + Sync>;

/// Registers the flood overlay: config, RNG, topology fetch, controller and
/// the per-frame systems.
///
/// Node coordinates are not loaded by the plugin; insert a populated
/// [`NodeCoordinates`] resource after adding it.
pub struct FloodOverlayPlugin {
    pub config: OverlayConfig,
    pub sink_factory: SinkFactory,
    pub topology: Option<Arc<dyn TopologySource>>,
}

impl FloodOverlayPlugin {
    pub fn new(config: OverlayConfig, sink_factory: SinkFactory) -> Self {
        Self {
            config,
            sink_factory,
            topology: None,
        }
    }

    pub fn with_topology(mut self, source: impl TopologySource) -> Self {
        self.topology = Some(Arc::new(source));
        self
    }
}

impl Plugin for FloodOverlayPlugin {
    fn build(&self, app: &mut App) {
        let rng = self
            .config
            .seed
            .map_or_else(OverlayRng::default, OverlayRng::from_seed_u64);

        app.insert_resource(self.config.clone())
            .insert_resource(rng)
            .insert_resource(FloodOverlay::new((self.sink_factory)(), &self.config))
            .init_resource::<NodeCoordinates>()
            .init_resource::<PipeFetch>()
            .init_resource::<animation::PendingOverlay>()
            .add_event::<EnableFloodOverlay>()
            .add_event::<DisableFloodOverlay>()
            .add_systems(
                Update,
                (
                    topology::dispatch_pipe_fetch,
                    topology::poll_pipe_fetch,
                    animation::sync_overlay_config,
                    animation::apply_overlay_requests,
                    animation::assemble_pending_overlay,
                    animation::drive_flood_animation,
                )
                    .chain(),
            );

        if let Some(source) = &self.topology {
            app.insert_resource(TopologyProvider(Arc::clone(source)));
        }
    }
}
