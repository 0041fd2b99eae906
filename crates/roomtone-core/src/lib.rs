//! Roomtone Core - zone-graph sound propagation
//!
//! This crate computes how much a building's rooms and doors occlude a sound
//! on its way from an emitter to a listener. Space is divided into zones
//! ("rooms") joined by connectors ("portals"). For each emitter/listener pair
//! the cheapest path through the graph is found and folded into a single
//! occlusion value in `[0, 255]`.
//!
//! # Core Abstractions
//!
//! ## Graph
//!
//! - [`ZoneGraph`] - Zones, connectors, and symmetric adjacency for one epoch
//! - [`ZoneDesc`] / [`ConnectorDesc`] - Authoring-side descriptors
//! - [`ZoneGraph::resolve`] - Position to zone, highest layer wins
//!
//! ## Search
//!
//! - [`CostModel`] - Connector traversal cost
//! - [`PathSearch`] - Dijkstra over preallocated scratch space
//! - [`IndexedMinHeap`] - Fixed-capacity min-heap with decrease-key
//!
//! ## Occlusion
//!
//! - [`reduce`] - Path to occlusion scalar
//! - [`PathCache`] - Per-emitter cache keyed by `(source zone, listener zone)`
//!
//! # no_std Support
//!
//! The crate is `no_std` + `alloc` compatible. Disable the default `std`
//! feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! roomtone-core = { version = "0.1", default-features = false }
//! ```
//!
//! Enable the `tracing` feature for debug logging of graph builds and
//! unreachable searches.
//!
//! # Example
//!
//! ```rust
//! use roomtone_core::{
//!     Aabb, ConnectorDesc, CostModel, GraphLimits, OcclusionParams, PathSearch, SearchParams,
//!     Vec3, ZoneDesc, ZoneGraph, reduce,
//! };
//!
//! let room = |id: u32, x: f32| {
//!     ZoneDesc::new(id, "room", Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 4.0, 3.0, 4.0)))
//! };
//! let zones = [room(1, 0.0), room(2, 10.0)];
//! let doors = [ConnectorDesc::new(1, "door", 1, 2, Vec3::new(7.0, 1.0, 2.0)).with_open(false)];
//! let graph = ZoneGraph::build(&zones, &doors, GraphLimits::default()).unwrap();
//!
//! let emitter = Vec3::new(2.0, 1.0, 2.0);
//! let listener = Vec3::new(12.0, 1.0, 2.0);
//! let (from, to) = (graph.resolve(emitter), graph.resolve(listener));
//!
//! let mut search = PathSearch::default();
//! let params = SearchParams { source_pos: emitter, listener_pos: listener, ..Default::default() };
//! search.find_path(&graph, &CostModel::default(), from, to, &params).unwrap().unwrap();
//!
//! let occlusion = reduce(
//!     &graph,
//!     search.path(),
//!     search.edges(),
//!     to,
//!     listener,
//!     &OcclusionParams::default(),
//! );
//! assert!(occlusion > 0.0 && occlusion < 255.0);
//! ```
//!
//! # Design Principles
//!
//! - **Allocation-free steady state**: search scratch is allocated once
//! - **Epoch-scoped indices**: [`ZoneIndex`] is dense and only valid until
//!   the next build
//! - **No ambient state**: every operation takes the graph it works on

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod cache;
pub mod connector;
pub mod cost;
pub mod emitter;
pub mod error;
pub mod graph;
pub mod heap;
pub mod math;
pub mod occlusion;
pub mod resolver;
pub mod search;
pub mod zone;

pub use cache::{CacheLookup, CacheStats, CachedPath, PathCache, REPATH_DISTANCE_SQ};
pub use connector::{Blocking, Connector, ConnectorDesc, ConnectorId, ConnectorIndex};
pub use cost::{CostModel, FALLBACK_EDGE_COST};
pub use emitter::{EmitterDesc, EmitterId, ListenerDesc, ListenerId, PropagationSettings};
pub use error::{BuildError, CapacityKind, QueryError, SearchError};
pub use graph::{
    DEFAULT_CONNECTOR_CAPACITY, DEFAULT_ZONE_CAPACITY, GraphLimits, SYNTHESIZED_GLOBAL_NAME,
    ZoneGraph,
};
pub use heap::IndexedMinHeap;
pub use math::{Aabb, Vec3, clamp01, lerp, smoothstep};
pub use occlusion::{MAX_OCCLUSION, OcclusionParams, reduce};
pub use search::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_PATH_COST, PathSearch, SearchOutcome, SearchParams,
};
pub use zone::{Zone, ZoneDesc, ZoneId, ZoneIndex};
