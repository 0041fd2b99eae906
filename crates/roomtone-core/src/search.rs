//! Cheapest-path search over a [`ZoneGraph`].
//!
//! Dijkstra with decrease-key over labels of `(zone, hops)`. All scratch
//! state (label costs, predecessors, the frontier, the per-expansion edge
//! table, and the output path) is allocated by [`PathSearch::new`] for the
//! default depth limit and reset in O(touched) at the start of each call. A
//! larger depth limit grows the label tables once; a warmed-up search never
//! allocates.
//!
//! # Edges
//!
//! When a zone is expanded, its candidate edges are:
//!
//! 1. the cheapest connector to each distinct neighbor zone, priced by
//!    [`CostModel::cost`] (first connector wins a tie), and
//! 2. each overlapping neighbor with no connector, at [`FALLBACK_EDGE_COST`].
//!
//! Leaving a zone reached in `k` hops adds a depth penalty `min(0.1 k, 1)`,
//! so the first hop is free and, among otherwise equal routes, fewer hops win.
//!
//! # Labels
//!
//! The penalty and the depth limit both depend on the hop count, so a zone
//! keeps one label per hop count. A label is dropped when the zone was
//! already settled at no more hops (an earlier settle is never more
//! expensive). A zone first settled through a cheap but long route is
//! therefore expanded again when a shorter route reaches it.
//!
//! The search always runs from the lower zone index and reverses the path
//! when needed, so `a -> b` and `b -> a` return the same cost, hop count, and
//! mirrored path.
//!
//! # Bounds
//!
//! - Labels at `max_depth` hops are not expanded further. The search records
//!   `depth_overflow` but the path it returns is unaffected.
//! - Tentative costs above `max_cost` are discarded.
//! - An unknown source or target, or a target outside the bounds, yields
//!   `Ok(None)`.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::connector::ConnectorIndex;
use crate::cost::{CostModel, FALLBACK_EDGE_COST};
use crate::error::SearchError;
use crate::graph::{DEFAULT_ZONE_CAPACITY, ZoneGraph};
use crate::heap::IndexedMinHeap;
use crate::math::Vec3;
use crate::zone::ZoneIndex;

/// Default maximum traversal depth, in connector hops.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default upper bound on aggregate path cost.
pub const DEFAULT_MAX_PATH_COST: f32 = 120.0;

const NO_PARENT: u32 = u32::MAX;
const UNSETTLED: u32 = u32::MAX;

/// Per-call search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Maximum number of hops from the source.
    pub max_depth: usize,
    /// Paths costing more than this are not explored.
    pub max_cost: f32,
    /// Emitter position, for connector distance costs.
    pub source_pos: Vec3,
    /// Listener position, for connector distance costs.
    pub listener_pos: Vec3,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_cost: DEFAULT_MAX_PATH_COST,
            source_pos: Vec3::ZERO,
            listener_pos: Vec3::ZERO,
        }
    }
}

/// Summary of a successful search. The path itself stays in the search's
/// scratch buffers; see [`PathSearch::path`] and [`PathSearch::edges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Aggregate cost, including depth penalties.
    pub cost: f32,
    /// Number of hops (`path.len() - 1`).
    pub hops: usize,
    /// Some zone was abandoned at the depth limit during this search.
    pub depth_overflow: bool,
}

/// Reusable shortest-path search.
#[derive(Debug, Clone)]
pub struct PathSearch {
    capacity: usize,
    heap: IndexedMinHeap,
    // Labels, indexed `zone * layers + hops`.
    cost: Vec<f32>,
    parent: Vec<u32>,
    via: Vec<Option<ConnectorIndex>>,
    touched: Vec<u32>,
    // Fewest hops at which each zone has been settled.
    settled_hops: Vec<u32>,
    settled_touched: Vec<u32>,
    // Candidate edge table for the zone being expanded.
    edge_cost: Vec<f32>,
    edge_via: Vec<Option<ConnectorIndex>>,
    edge_touched: Vec<u32>,
    path: Vec<ZoneIndex>,
    edges: Vec<Option<ConnectorIndex>>,
}

impl Default for PathSearch {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE_CAPACITY)
    }
}

impl PathSearch {
    /// Allocates scratch space for graphs of up to `capacity` zones.
    pub fn new(capacity: usize) -> Self {
        let labels = capacity * (DEFAULT_MAX_DEPTH + 1);
        Self {
            capacity,
            heap: IndexedMinHeap::with_capacity(labels),
            cost: vec![f32::INFINITY; labels],
            parent: vec![NO_PARENT; labels],
            via: vec![None; labels],
            touched: Vec::with_capacity(labels),
            settled_hops: vec![UNSETTLED; capacity],
            settled_touched: Vec::with_capacity(capacity),
            edge_cost: vec![f32::INFINITY; capacity],
            edge_via: vec![None; capacity],
            edge_touched: Vec::with_capacity(capacity),
            path: Vec::with_capacity(capacity),
            edges: Vec::with_capacity(capacity),
        }
    }

    /// Maximum zone count this search can handle.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Zones of the last path found, source first. Empty after a miss.
    pub fn path(&self) -> &[ZoneIndex] {
        &self.path
    }

    /// Connector used for each hop of the last path; `None` marks an
    /// overlap edge. Always one shorter than [`path`](Self::path).
    pub fn edges(&self) -> &[Option<ConnectorIndex>] {
        &self.edges
    }

    /// Finds the cheapest path from `source` to `target`.
    ///
    /// Returns `Ok(None)` when no path exists within the bounds in `params`
    /// or when either zone is not part of `graph`.
    ///
    /// # Errors
    ///
    /// [`SearchError::CapacityExceeded`] if `graph` has more zones than this
    /// search was allocated for.
    pub fn find_path(
        &mut self,
        graph: &ZoneGraph,
        model: &CostModel,
        source: ZoneIndex,
        target: ZoneIndex,
        params: &SearchParams,
    ) -> Result<Option<SearchOutcome>, SearchError> {
        if graph.zone_count() > self.capacity {
            return Err(SearchError::CapacityExceeded {
                zones: graph.zone_count(),
                capacity: self.capacity,
            });
        }

        self.reset();

        if !graph.contains_zone(source) || !graph.contains_zone(target) {
            return Ok(None);
        }

        if source == target {
            self.path.push(source);
            return Ok(Some(SearchOutcome {
                cost: 0.0,
                hops: 0,
                depth_overflow: false,
            }));
        }

        let swapped = target.get() < source.get();
        let (from, to) = if swapped {
            (target, source)
        } else {
            (source, target)
        };

        // A cheapest route never revisits a zone, so it has fewer hops than
        // there are zones.
        let limit = params.max_depth.min(graph.zone_count() - 1);
        let layers = limit + 1;
        self.reserve_labels(graph.zone_count() * layers);

        let mut depth_overflow = false;
        let start = from.get() * layers;
        self.label(start, 0.0, NO_PARENT, None);
        self.heap.push_or_decrease(start, 0.0)?;

        while let Some((state, cost_u)) = self.heap.pop_min() {
            let (u, hops) = (state / layers, state % layers);
            if self.settled_hops[u] as usize <= hops {
                continue;
            }
            if self.settled_hops[u] == UNSETTLED {
                self.settled_touched.push(u as u32);
            }
            self.settled_hops[u] = hops as u32;

            if u == to.get() {
                self.reconstruct(state, layers);
                if swapped {
                    self.path.reverse();
                    self.edges.reverse();
                }
                return Ok(Some(SearchOutcome {
                    cost: cost_u,
                    hops,
                    depth_overflow,
                }));
            }

            if hops >= limit {
                depth_overflow |= hops >= params.max_depth;
                continue;
            }

            let next = hops + 1;
            self.collect_edges(graph, model, ZoneIndex(u as u32), next, params);

            let penalty = (hops as f32 * 0.1).min(1.0);
            for i in 0..self.edge_touched.len() {
                let v = self.edge_touched[i] as usize;
                let candidate = cost_u + self.edge_cost[v] + penalty;
                let label = v * layers + next;
                if candidate > params.max_cost || candidate >= self.cost[label] {
                    continue;
                }
                let via = self.edge_via[v];
                self.label(label, candidate, state as u32, via);
                self.heap.push_or_decrease(label, candidate)?;
            }
            self.clear_edges();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "path_search: {} unreachable from {} (depth_overflow={})",
            target,
            source,
            depth_overflow
        );
        Ok(None)
    }

    /// Fills the candidate edge table for `zone`, skipping neighbors already
    /// settled at `next` hops or fewer.
    fn collect_edges(
        &mut self,
        graph: &ZoneGraph,
        model: &CostModel,
        zone: ZoneIndex,
        next: usize,
        params: &SearchParams,
    ) {
        for &ci in graph.connectors_of(zone) {
            let Some(connector) = graph.connector(ci) else {
                continue;
            };
            let v = connector.other(zone).get();
            if self.settled_hops[v] as usize <= next {
                continue;
            }
            let cost = model.cost(connector, params.source_pos, params.listener_pos);
            if self.edge_cost[v] == f32::INFINITY {
                self.edge_touched.push(v as u32);
            }
            if cost < self.edge_cost[v] {
                self.edge_cost[v] = cost;
                self.edge_via[v] = Some(ci);
            }
        }

        for &n in graph.neighbors_of(zone) {
            let v = n.get();
            if self.settled_hops[v] as usize <= next || self.edge_cost[v] != f32::INFINITY {
                continue;
            }
            self.edge_cost[v] = FALLBACK_EDGE_COST;
            self.edge_via[v] = None;
            self.edge_touched.push(v as u32);
        }
    }

    fn clear_edges(&mut self) {
        for &v in &self.edge_touched {
            self.edge_cost[v as usize] = f32::INFINITY;
            self.edge_via[v as usize] = None;
        }
        self.edge_touched.clear();
    }

    /// Grows the label tables to hold `labels` entries.
    fn reserve_labels(&mut self, labels: usize) {
        if labels <= self.cost.len() {
            return;
        }
        self.cost.resize(labels, f32::INFINITY);
        self.parent.resize(labels, NO_PARENT);
        self.via.resize(labels, None);
        self.touched.reserve(labels - self.touched.len());
        self.heap.reserve_items(labels);
    }

    #[inline]
    fn label(&mut self, at: usize, cost: f32, parent: u32, via: Option<ConnectorIndex>) {
        if self.cost[at] == f32::INFINITY {
            self.touched.push(at as u32);
        }
        self.cost[at] = cost;
        self.parent[at] = parent;
        self.via[at] = via;
    }

    fn reconstruct(&mut self, state: usize, layers: usize) {
        let mut at = state as u32;
        while at != NO_PARENT {
            self.path.push(ZoneIndex(at / layers as u32));
            let parent = self.parent[at as usize];
            if parent != NO_PARENT {
                self.edges.push(self.via[at as usize]);
            }
            at = parent;
        }
        self.path.reverse();
        self.edges.reverse();
    }

    fn reset(&mut self) {
        for &at in &self.touched {
            let at = at as usize;
            self.cost[at] = f32::INFINITY;
            self.parent[at] = NO_PARENT;
            self.via[at] = None;
        }
        self.touched.clear();
        for &z in &self.settled_touched {
            self.settled_hops[z as usize] = UNSETTLED;
        }
        self.settled_touched.clear();
        self.heap.clear();
        self.clear_edges();
        self.path.clear();
        self.edges.clear();
    }
}
