//! Static network topology: node coordinates and pipe polylines.
//!
//! Node coordinates (inlets and drains) are supplied up front as the
//! [`NodeCoordinates`] resource. Pipe polylines are fetched asynchronously
//! from a [`TopologySource`] on the IO task pool, with a bounded retry, and
//! land in the [`PipeFetch`] resource. A fetch that keeps failing or returns
//! no features resolves to [`PipeFetch::Unavailable`], and the overlay falls
//! back to the node field only.

pub mod fetch;
pub mod types;


pub use fetch::{
    dispatch_pipe_fetch, poll_pipe_fetch, GeoJsonFileTopology, PipeFetch, StaticTopology,
    TopologyProvider, TopologySource,
};
pub use types::{
    nodes_from_collection, pipes_from_collection, NodeCoordinate, NodeCoordinates, PipePolyline,
    NODE_ID_KEYS, PIPE_ID_KEYS,
};
