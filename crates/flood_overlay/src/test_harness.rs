//! # TestOverlay: headless harness for the flood overlay plugin
//!
//! Wraps a Bevy `App` with `MinimalPlugins` and `FloodOverlayPlugin`, a
//! manually stepped clock, a [`RecordingSink`] that remembers every push, and
//! an in-memory pipe network.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::animation::FloodOverlay;
use crate::config::OverlayConfig;
use crate::geo::LngLat;
use crate::geojson::FeatureCollection;
use crate::records::VulnerabilityRecord;
use crate::render::{layer_id, RenderSink, ALL_SOURCES};
use crate::topology::{NodeCoordinates, PipeFetch, PipePolyline, StaticTopology};
use crate::{DisableFloodOverlay, EnableFloodOverlay, FloodOverlayPlugin, SinkFactory};

#[derive(Debug, Default)]
struct SinkLog {
    layers: HashSet<String>,
    pushes: Vec<(String, FeatureCollection)>,
}

/// Render sink that records pushes. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<SinkLog>>,
}

impl RecordingSink {
    /// Every overlay layer exists.
    pub fn ready() -> Self {
        let sink = Self::default();
        sink.set_ready(true);
        sink
    }

    /// No overlay layer exists yet.
    pub fn not_ready() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        let mut log = self.log.lock().unwrap();
        log.layers.clear();
        if ready {
            log.layers
                .extend(ALL_SOURCES.iter().map(|source| layer_id(source)));
        }
    }

    pub fn pushes_for(&self, source: &str) -> Vec<FeatureCollection> {
        self.log
            .lock()
            .unwrap()
            .pushes
            .iter()
            .filter(|(s, _)| s == source)
            .map(|(_, data)| data.clone())
            .collect()
    }

    pub fn push_count(&self) -> usize {
        self.log.lock().unwrap().pushes.len()
    }
}

impl RenderSink for RecordingSink {
    fn has_layer(&self, layer: &str) -> bool {
        self.log.lock().unwrap().layers.contains(layer)
    }

    fn replace_source_data(&mut self, source: &str, data: FeatureCollection) {
        self.log
            .lock()
            .unwrap()
            .pushes
            .push((source.to_string(), data));
    }
}

/// Default frame step: slower than the 20 Hz throttle, so every frame ticks.
pub const DEFAULT_FRAME_STEP: Duration = Duration::from_millis(60);

pub struct TestOverlay {
    app: App,
    sink: RecordingSink,
}

impl TestOverlay {
    /// A harness over three junctions in a row with one pipe from N1 to N2.
    pub fn new() -> Self {
        Self::with_config(OverlayConfig::default())
    }

    pub fn with_config(config: OverlayConfig) -> Self {
        let mut nodes = NodeCoordinates::default();
        nodes.insert("N1", [0.0, 0.0]);
        nodes.insert("N2", [0.0, 0.001]);
        nodes.insert("N3", [0.0, 0.002]);
        let pipes = vec![pipe("P1", vec![[0.0, 0.0], [0.0, 0.001]])];
        Self::with_network(config, nodes, Some(pipes))
    }

    /// `pipes: None` registers no topology source at all.
    pub fn with_network(
        config: OverlayConfig,
        nodes: NodeCoordinates,
        pipes: Option<Vec<PipePolyline>>,
    ) -> Self {
        let sink = RecordingSink::ready();
        let factory_sink = sink.clone();
        let factory: SinkFactory =
            Arc::new(move || -> Box<dyn RenderSink> { Box::new(factory_sink.clone()) });

        let mut plugin = FloodOverlayPlugin::new(config, factory);
        if let Some(pipes) = pipes {
            plugin = plugin.with_topology(StaticTopology::new(pipes));
        }

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(plugin);
        app.insert_resource(nodes);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(DEFAULT_FRAME_STEP));
        Self { app, sink }
    }

    pub fn sink(&self) -> &RecordingSink {
        &self.sink
    }

    pub fn set_frame_step(&mut self, step: Duration) -> &mut Self {
        self.app
            .insert_resource(TimeUpdateStrategy::ManualDuration(step));
        self
    }

    pub fn enable(&mut self, records: Vec<VulnerabilityRecord>) -> &mut Self {
        self.app.world_mut().send_event(EnableFloodOverlay(records));
        self
    }

    pub fn disable(&mut self) -> &mut Self {
        self.app.world_mut().send_event(DisableFloodOverlay);
        self
    }

    pub fn tick(&mut self) -> &mut Self {
        self.app.update();
        self
    }

    pub fn tick_n(&mut self, n: usize) -> &mut Self {
        for _ in 0..n {
            self.app.update();
        }
        self
    }

    /// Run frames until the pipe fetch resolves (bounded).
    pub fn wait_for_topology(&mut self) -> &mut Self {
        for _ in 0..200 {
            if self.app.world().resource::<PipeFetch>().is_resolved() {
                break;
            }
            self.app.update();
        }
        self
    }

    pub fn overlay(&self) -> &FloodOverlay {
        self.app.world().resource::<FloodOverlay>()
    }

    pub fn is_running(&self) -> bool {
        self.overlay().is_running()
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}

impl Default for TestOverlay {
    fn default() -> Self {
        Self::new()
    }
}

pub fn pipe(id: &str, vertices: Vec<LngLat>) -> PipePolyline {
    PipePolyline::new(id, vertices).unwrap()
}

/// The three-node scenario: N1 high, N2 medium, N3 dry.
pub fn scenario_records() -> Vec<VulnerabilityRecord> {
    vec![
        VulnerabilityRecord::new("N1", "High Risk", 20.0),
        VulnerabilityRecord::new("N2", "Medium Risk", 5.0),
        VulnerabilityRecord::new("N3", "No Risk", 0.0),
    ]
}
