//! Asynchronous pipe network fetch.
//!
//! `dispatch_pipe_fetch` spawns the fetch on the `IoTaskPool`;
//! `poll_pipe_fetch` polls it once per frame without blocking. Failures are
//! retried per `OverlayConfig::topology_retry` by parking the state in
//! `PipeFetch::Backoff` until the delay has elapsed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::{block_on, IoTaskPool, Task};
use futures_lite::future;

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::geojson::FeatureCollection;
use crate::retry::RetryDecision;

use super::types::{pipes_from_collection, PipePolyline};

/// Where pipe polylines come from (a persistence service, a file, memory).
/// Called from an IO task, so it may block.
pub trait TopologySource: Send + Sync + 'static {
    fn fetch_pipes(&self) -> Result<Vec<PipePolyline>, OverlayError>;
}

/// In-memory pipe set.
#[derive(Debug, Clone, Default)]
pub struct StaticTopology {
    pipes: Vec<PipePolyline>,
}

impl StaticTopology {
    pub fn new(pipes: Vec<PipePolyline>) -> Self {
        Self { pipes }
    }
}

impl TopologySource for StaticTopology {
    fn fetch_pipes(&self) -> Result<Vec<PipePolyline>, OverlayError> {
        Ok(self.pipes.clone())
    }
}

/// Pipes read from a GeoJSON file of LineString features.
#[derive(Debug, Clone)]
pub struct GeoJsonFileTopology {
    path: PathBuf,
}

impl GeoJsonFileTopology {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TopologySource for GeoJsonFileTopology {
    fn fetch_pipes(&self) -> Result<Vec<PipePolyline>, OverlayError> {
        let text = std::fs::read_to_string(&self.path)?;
        let collection = FeatureCollection::from_json_str(&text)?;
        Ok(pipes_from_collection(&collection))
    }
}

#[derive(Resource, Clone)]
pub struct TopologyProvider(pub Arc<dyn TopologySource>);

/// Lifecycle of the pipe network fetch.
#[derive(Resource, Default)]
pub enum PipeFetch {
    #[default]
    Idle,
    InFlight {
        task: Task<Result<Vec<PipePolyline>, OverlayError>>,
        /// 1-based attempt number of the running fetch.
        attempt: u32,
    },
    Backoff {
        retry_at: Duration,
        attempt: u32,
    },
    Ready(Arc<Vec<PipePolyline>>),
    /// Fetch failed for good or returned nothing; only node points render.
    Unavailable,
}

impl PipeFetch {
    /// True once the overlay can be assembled (with or without pipes).
    pub fn is_resolved(&self) -> bool {
        matches!(self, PipeFetch::Ready(_) | PipeFetch::Unavailable)
    }

    /// Fetched pipes, `None` until ready and when unavailable.
    pub fn pipes(&self) -> Option<&[PipePolyline]> {
        match self {
            PipeFetch::Ready(pipes) => Some(pipes.as_slice()),
            _ => None,
        }
    }
}

/// Start a fetch when idle, or when a backoff delay has elapsed.
pub fn dispatch_pipe_fetch(
    time: Res<Time>,
    provider: Option<Res<TopologyProvider>>,
    mut fetch: ResMut<PipeFetch>,
) {
    let attempt = match *fetch {
        PipeFetch::Idle => 1,
        PipeFetch::Backoff { retry_at, attempt } if time.elapsed() >= retry_at => attempt,
        _ => return,
    };

    let Some(provider) = provider else {
        warn!(
            "Flood overlay: {}",
            OverlayError::TopologyUnavailable("no topology source registered".to_string())
        );
        *fetch = PipeFetch::Unavailable;
        return;
    };

    let source = Arc::clone(&provider.0);
    let task = IoTaskPool::get().spawn(async move { source.fetch_pipes() });
    *fetch = PipeFetch::InFlight { task, attempt };
}

/// Poll an in-flight fetch once and resolve it if finished.
pub fn poll_pipe_fetch(
    time: Res<Time>,
    config: Res<OverlayConfig>,
    mut fetch: ResMut<PipeFetch>,
) {
    let (result, attempt) = match &mut *fetch {
        PipeFetch::InFlight { task, attempt } => match block_on(future::poll_once(task)) {
            Some(result) => (result, *attempt),
            None => return,
        },
        _ => return,
    };
    *fetch = resolve_fetch(result, attempt, &config, time.elapsed());
}

pub(crate) fn resolve_fetch(
    result: Result<Vec<PipePolyline>, OverlayError>,
    attempt: u32,
    config: &OverlayConfig,
    now: Duration,
) -> PipeFetch {
    match result {
        Ok(pipes) if pipes.is_empty() => {
            warn!(
                "Flood overlay: {}; showing node field only",
                OverlayError::TopologyUnavailable("pipe source returned no features".to_string())
            );
            PipeFetch::Unavailable
        }
        Ok(pipes) => {
            info!("Flood overlay: {} pipes loaded", pipes.len());
            PipeFetch::Ready(Arc::new(pipes))
        }
        Err(e) => match config.topology_retry.after_failure(attempt, now) {
            RetryDecision::RetryAt(retry_at) => {
                warn!(
                    "Flood overlay: pipe fetch attempt {} failed ({}), retrying",
                    attempt, e
                );
                PipeFetch::Backoff {
                    retry_at,
                    attempt: attempt + 1,
                }
            }
            RetryDecision::GiveUp => {
                warn!(
                    "Flood overlay: {}; showing node field only",
                    OverlayError::TopologyUnavailable(format!(
                        "{attempt} fetch attempts failed, last error: {e}"
                    ))
                );
                PipeFetch::Unavailable
            }
        },
    }
}
