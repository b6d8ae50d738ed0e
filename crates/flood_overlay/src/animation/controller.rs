//! The flood overlay controller: Stopped/Running state machine, throttled
//! ticks and pushes into the render sink.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::geojson::FeatureCollection;
use crate::gradient::ColoredSegment;
use crate::pipeline::{build_overlay, BuildReport};
use crate::records::VulnerabilityRecord;
use crate::render::{
    layer_id, points_collection, segments_collection, RenderSink, ALL_SOURCES, GRADIENT_SOURCE,
    LINE_FIELD_SOURCE, NODE_FIELD_SOURCE,
};
use crate::retry::RetryDecision;
use crate::topology::{NodeCoordinates, PipePolyline};

use super::scheduler::{FrameScheduler, Scheduler, TickHandle};
use super::state::{tick, AnimationState};

/// Owns the animation state, the scheduler handle and the render sink.
///
/// There is exactly one writer: ticks arrive through [`FloodOverlay::on_tick`]
/// with the handle the scheduler was given, and a handle that is no longer
/// the pending one (cancelled by `disable` or superseded by `enable`) is
/// ignored, so no frame computed for an old state ever reaches the sink.
#[derive(Resource)]
pub struct FloodOverlay<S: Scheduler = FrameScheduler> {
    sink: Box<dyn RenderSink>,
    scheduler: S,
    config: OverlayConfig,
    state: AnimationState,
    segments: Vec<ColoredSegment>,
    segments_pushed: bool,
    pending_tick: Option<TickHandle>,
    push_failures: u32,
    push_retry_at: Option<Duration>,
}

impl FloodOverlay<FrameScheduler> {
    pub fn new(sink: Box<dyn RenderSink>, config: &OverlayConfig) -> Self {
        Self::with_scheduler(sink, FrameScheduler::default(), config)
    }
}

impl<S: Scheduler> FloodOverlay<S> {
    pub fn with_scheduler(sink: Box<dyn RenderSink>, scheduler: S, config: &OverlayConfig) -> Self {
        Self {
            sink,
            scheduler,
            config: config.clone(),
            state: AnimationState::stopped(),
            segments: Vec::new(),
            segments_pushed: false,
            pending_tick: None,
            push_failures: 0,
            push_retry_at: None,
        }
    }

    /// Build the overlay for a new simulation result and start animating it.
    ///
    /// Replaces any previous state wholesale. The first frame is computed and
    /// pushed immediately. `pipes` is `None` when the network is unavailable,
    /// which leaves only the node field.
    pub fn enable<R: Rng + ?Sized>(
        &mut self,
        records: &[VulnerabilityRecord],
        nodes: &NodeCoordinates,
        pipes: Option<&[PipePolyline]>,
        rng: &mut R,
        now: Duration,
    ) -> BuildReport {
        let build = build_overlay(records, nodes, pipes, &self.config, rng);
        self.cancel_pending();
        self.state = AnimationState::running(build.fields);
        self.segments = build.segments;
        self.segments_pushed = false;
        self.push_failures = 0;
        self.push_retry_at = None;
        info!(
            "Flood overlay enabled: {} segments, {} node points, {} line points",
            build.report.segments, build.report.node_points, build.report.line_points
        );

        self.advance(now);
        if self.state.running {
            self.schedule_next();
        }
        build.report
    }

    /// Stop animating and clear whatever the overlay has rendered.
    pub fn disable(&mut self) {
        let was_running = self.state.running;
        self.stop();
        self.state = AnimationState::stopped();
        self.segments.clear();
        self.segments_pushed = false;
        self.push_failures = 0;
        self.push_retry_at = None;
        for source in ALL_SOURCES {
            if self.sink.has_layer(&layer_id(source)) {
                self.sink.replace_source_data(source, FeatureCollection::default());
            }
        }
        if was_running {
            info!("Flood overlay disabled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Host callback for a fired tick.
    pub fn on_tick(&mut self, handle: TickHandle, now: Duration) {
        if self.pending_tick != Some(handle) {
            debug!("Flood overlay: ignoring stale tick {:?}", handle);
            return;
        }
        self.pending_tick = None;
        if !self.state.running {
            return;
        }

        let interval = self.config.tick_interval();
        let due = self
            .state
            .last_tick
            .map_or(true, |last| now.saturating_sub(last) >= interval);
        if due {
            self.advance(now);
        }
        // Early ticks are dropped here and folded into the next one.
        if self.state.running {
            self.schedule_next();
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn segments(&self) -> &[ColoredSegment] {
        &self.segments
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending_tick
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// New tunables apply from the next tick; already built fields keep
    /// their sampling and jitter.
    pub fn set_config(&mut self, config: &OverlayConfig) {
        self.config = config.clone();
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn schedule_next(&mut self) {
        self.pending_tick = Some(self.scheduler.schedule_tick());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn stop(&mut self) {
        self.state.running = false;
        self.cancel_pending();
    }

    fn advance(&mut self, now: Duration) {
        let state = std::mem::take(&mut self.state);
        self.state = tick(state, now, &self.config.pulse);
        self.push(now);
    }

    fn push(&mut self, now: Duration) {
        if self.push_retry_at.is_some_and(|at| now < at) {
            return;
        }

        let missing = ALL_SOURCES
            .iter()
            .map(|source| layer_id(source))
            .find(|layer| !self.sink.has_layer(layer));

        let Some(layer) = missing else {
            self.push_failures = 0;
            self.push_retry_at = None;
            if !self.segments_pushed {
                self.sink
                    .replace_source_data(GRADIENT_SOURCE, segments_collection(&self.segments));
                self.segments_pushed = true;
            }
            self.sink
                .replace_source_data(NODE_FIELD_SOURCE, points_collection(&self.state.fields.nodes));
            self.sink
                .replace_source_data(LINE_FIELD_SOURCE, points_collection(&self.state.fields.lines));
            return;
        };

        self.push_failures += 1;
        match self.config.render_retry.after_failure(self.push_failures, now) {
            RetryDecision::RetryAt(at) => {
                debug!(
                    "Flood overlay: layer {} not ready (attempt {}), retrying",
                    layer, self.push_failures
                );
                self.push_retry_at = Some(at);
            }
            RetryDecision::GiveUp => {
                error!(
                    "Flood overlay: {}; animation stopped",
                    OverlayError::RenderTargetNotReady {
                        layer,
                        attempts: self.push_failures,
                    }
                );
                self.stop();
            }
        }
    }
}
