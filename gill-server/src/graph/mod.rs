//! Station graph and shortest-path engine.
//!
//! The graph holds immutable station and travel-edge reference data; the
//! path module runs Dijkstra over it to produce travel times, station
//! paths, and transfer counts for the matching layer.

mod path;
mod store;

pub use path::{Eta, PathResult};
pub use store::StationGraph;
