//! Zone graph: the registry of zones, connectors, and adjacency.
//!
//! A [`ZoneGraph`] is built wholesale from descriptors by [`ZoneGraph::build`]
//! and lives for one *epoch*, until the next successful build replaces it.
//! Building never mutates an existing graph, so a failed rebuild leaves the
//! previous epoch fully usable.
//!
//! # Adjacency
//!
//! Every zone keeps two lists:
//!
//! - **connectors** touching it (self-loops excluded), and
//! - **neighbors**: zones whose bounding volumes overlap its own, linked when
//!   both sit on the same layer or when any connector joins them.
//!
//! Both relations are symmetric: if A lists B, B lists A. Neighbors act as
//! fallback edges during search when no connector joins two zones.
//!
//! # Global zone
//!
//! Exactly one zone is the global fallback. If none is authored, one is
//! synthesized and appended after the authored zones. Connector endpoints
//! that are missing or unknown are redirected to it.

#[cfg(not(feature = "std"))]
use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};
#[cfg(feature = "std")]
use std::collections::{BTreeMap, BTreeSet};

use crate::connector::{Connector, ConnectorDesc, ConnectorId, ConnectorIndex};
use crate::error::{BuildError, CapacityKind, QueryError};
use crate::zone::{Zone, ZoneDesc, ZoneId, ZoneIndex};

/// Default maximum number of zones per graph (and per search scratch space).
pub const DEFAULT_ZONE_CAPACITY: usize = 1024;

/// Default maximum number of connectors per graph.
pub const DEFAULT_CONNECTOR_CAPACITY: usize = 4096;

/// Name given to a synthesized global zone.
pub const SYNTHESIZED_GLOBAL_NAME: &str = "Global";

/// Fixed bounds on graph size. Exceeding either is a build error, never a
/// silent truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLimits {
    /// Maximum zones, counting a synthesized global zone.
    pub max_zones: usize,
    /// Maximum enabled connectors.
    pub max_connectors: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_zones: DEFAULT_ZONE_CAPACITY,
            max_connectors: DEFAULT_CONNECTOR_CAPACITY,
        }
    }
}

impl GraphLimits {
    /// Limits with a custom zone bound and the default connector bound.
    pub fn with_max_zones(max_zones: usize) -> Self {
        Self {
            max_zones,
            ..Self::default()
        }
    }
}

/// Per-zone adjacency.
#[derive(Debug, Clone, Default, PartialEq)]
struct ZoneLinks {
    connectors: Vec<ConnectorIndex>,
    neighbors: Vec<ZoneIndex>,
}

/// Zone graph for one epoch.
#[derive(Debug, Clone)]
pub struct ZoneGraph {
    zones: Vec<Zone>,
    connectors: Vec<Connector>,
    links: Vec<ZoneLinks>,
    zone_lookup: BTreeMap<ZoneId, ZoneIndex>,
    connector_lookup: BTreeMap<ConnectorId, ConnectorIndex>,
    global: ZoneIndex,
    global_synthesized: bool,
    limits: GraphLimits,
}

impl ZoneGraph {
    /// Builds a graph from zone and connector descriptors.
    ///
    /// Zones receive dense indices in arrival order. A global zone is
    /// synthesized when none is authored. Disabled connectors are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when the zone list is empty, a bound in
    /// `limits` is exceeded, identities collide, more than one global zone is
    /// flagged, or a global zone is needed but cannot be synthesized.
    pub fn build(
        zones: &[ZoneDesc],
        connectors: &[ConnectorDesc],
        limits: GraphLimits,
    ) -> Result<Self, BuildError> {
        if zones.is_empty() {
            return Err(BuildError::EmptyZoneList);
        }

        let mut authored_global: Option<ZoneId> = None;
        for desc in zones.iter().filter(|z| z.is_global) {
            if let Some(first) = authored_global {
                return Err(BuildError::MultipleGlobalZones {
                    first,
                    second: desc.id,
                });
            }
            authored_global = Some(desc.id);
        }

        if zones.len() > limits.max_zones {
            return Err(BuildError::CapacityExceeded {
                kind: CapacityKind::Zones,
                count: zones.len() + usize::from(authored_global.is_none()),
                capacity: limits.max_zones,
            });
        }
        if authored_global.is_none() && zones.len() + 1 > limits.max_zones {
            return Err(BuildError::NoGlobalZone {
                reason: "zone capacity is already full",
            });
        }

        // Zones, in arrival order.
        let mut built_zones = Vec::with_capacity(zones.len() + 1);
        let mut zone_lookup = BTreeMap::new();
        for (i, desc) in zones.iter().enumerate() {
            let index = ZoneIndex(i as u32);
            if zone_lookup.insert(desc.id, index).is_some() {
                return Err(BuildError::DuplicateZone(desc.id));
            }
            built_zones.push(Zone::from_desc(desc, index));
        }

        let global_synthesized = authored_global.is_none();
        let global = match authored_global {
            Some(id) => zone_lookup[&id],
            None => {
                let id = free_zone_id(&zone_lookup).ok_or(BuildError::NoGlobalZone {
                    reason: "every zone id is taken",
                })?;
                let index = ZoneIndex(built_zones.len() as u32);
                let desc = ZoneDesc::global(id.0, SYNTHESIZED_GLOBAL_NAME);
                zone_lookup.insert(id, index);
                built_zones.push(Zone::from_desc(&desc, index));
                #[cfg(feature = "tracing")]
                tracing::debug!("graph_build: synthesized global zone {id} at {index}");
                index
            }
        };

        // Connectors.
        let enabled = connectors.iter().filter(|c| c.enabled).count();
        if enabled > limits.max_connectors {
            return Err(BuildError::CapacityExceeded {
                kind: CapacityKind::Connectors,
                count: enabled,
                capacity: limits.max_connectors,
            });
        }

        let mut built_connectors: Vec<Connector> = Vec::with_capacity(enabled);
        let mut connector_lookup = BTreeMap::new();
        for desc in connectors {
            if !desc.enabled {
                #[cfg(feature = "tracing")]
                tracing::debug!("graph_build: connector {} is disabled, skipped", desc.id);
                continue;
            }
            let index = ConnectorIndex(built_connectors.len() as u32);
            if connector_lookup.insert(desc.id, index).is_some() {
                return Err(BuildError::DuplicateConnector(desc.id));
            }

            let a = desc.zone_a.and_then(|id| zone_lookup.get(&id).copied());
            let b = desc.zone_b.and_then(|id| zone_lookup.get(&id).copied());
            #[cfg(feature = "tracing")]
            if a.is_none() || b.is_none() {
                tracing::warn!(
                    "graph_build: connector {} '{}' has a missing endpoint, redirected to global zone",
                    desc.id,
                    desc.name
                );
            }

            built_connectors.push(Connector {
                id: desc.id,
                index,
                name: desc.name.clone(),
                zones: [a.unwrap_or(global), b.unwrap_or(global)],
                position: desc.position,
                open: desc.open,
                weight: desc.weight,
                blocking: desc.blocking,
            });
        }

        // Adjacency: connectors first, then overlapping neighbors.
        let mut links = vec_of_default_links(built_zones.len());
        let mut joined: BTreeSet<(u32, u32)> = BTreeSet::new();
        for connector in &built_connectors {
            if connector.is_self_loop() {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "graph_build: connector {} joins {} to itself, excluded from adjacency",
                    connector.id,
                    connector.zones[0]
                );
                continue;
            }
            let [a, b] = connector.zones;
            links[a.get()].connectors.push(connector.index);
            links[b.get()].connectors.push(connector.index);
            joined.insert(ordered_pair(a, b));
        }

        for i in 0..built_zones.len() {
            let Some(bounds_i) = built_zones[i].bounds else {
                continue;
            };
            for j in (i + 1)..built_zones.len() {
                let Some(bounds_j) = built_zones[j].bounds else {
                    continue;
                };
                let (zi, zj) = (built_zones[i].index, built_zones[j].index);
                let same_layer = built_zones[i].layer == built_zones[j].layer;
                if !same_layer && !joined.contains(&ordered_pair(zi, zj)) {
                    continue;
                }
                if bounds_i.intersects(&bounds_j) {
                    links[i].neighbors.push(zj);
                    links[j].neighbors.push(zi);
                }
            }
        }

        let graph = Self {
            zones: built_zones,
            connectors: built_connectors,
            links,
            zone_lookup,
            connector_lookup,
            global,
            global_synthesized,
            limits,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_build: {} zones, {} connectors, global {}",
            graph.zone_count(),
            graph.connector_count(),
            graph.global
        );

        Ok(graph)
    }

    // --- Zones ---

    /// Number of zones, including the global zone.
    #[inline]
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// All zones in index order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Zone at `index`, or `None` if the index is not part of this epoch.
    #[inline]
    pub fn zone(&self, index: ZoneIndex) -> Option<&Zone> {
        self.zones.get(index.get())
    }

    /// Whether `index` belongs to this epoch.
    #[inline]
    pub fn contains_zone(&self, index: ZoneIndex) -> bool {
        index.get() < self.zones.len()
    }

    /// Resolves a stable zone id to this epoch's index.
    pub fn index_of(&self, id: ZoneId) -> Result<ZoneIndex, QueryError> {
        self.zone_lookup
            .get(&id)
            .copied()
            .ok_or(QueryError::UnknownZone(id))
    }

    /// Looks up a zone by stable id.
    pub fn zone_by_id(&self, id: ZoneId) -> Result<&Zone, QueryError> {
        let index = self.index_of(id)?;
        Ok(&self.zones[index.get()])
    }

    /// Looks up a zone by name. Linear scan, meant for tooling.
    pub fn zone_by_name(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// The global fallback zone.
    #[inline]
    pub fn global_zone(&self) -> ZoneIndex {
        self.global
    }

    /// Whether the global zone was synthesized by the builder.
    #[inline]
    pub fn global_synthesized(&self) -> bool {
        self.global_synthesized
    }

    /// The limits this graph was built under.
    #[inline]
    pub fn limits(&self) -> GraphLimits {
        self.limits
    }

    // --- Connectors ---

    /// Number of enabled connectors.
    #[inline]
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    /// All connectors in index order.
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Connector at `index`.
    #[inline]
    pub fn connector(&self, index: ConnectorIndex) -> Option<&Connector> {
        self.connectors.get(index.get())
    }

    /// Resolves a stable connector id to this epoch's index.
    pub fn connector_index_of(&self, id: ConnectorId) -> Result<ConnectorIndex, QueryError> {
        self.connector_lookup
            .get(&id)
            .copied()
            .ok_or(QueryError::UnknownConnector(id))
    }

    /// Looks up a connector by stable id.
    pub fn connector_by_id(&self, id: ConnectorId) -> Result<&Connector, QueryError> {
        let index = self.connector_index_of(id)?;
        Ok(&self.connectors[index.get()])
    }

    /// Opens or closes a connector. Returns `true` if the state changed.
    pub fn set_connector_open(&mut self, id: ConnectorId, open: bool) -> Result<bool, QueryError> {
        let index = self.connector_index_of(id)?;
        let connector = &mut self.connectors[index.get()];
        let changed = connector.open != open;
        connector.open = open;
        #[cfg(feature = "tracing")]
        if changed {
            tracing::debug!(
                "connector {} '{}' is now {}",
                id,
                connector.name,
                if open { "open" } else { "closed" }
            );
        }
        Ok(changed)
    }

    // --- Adjacency ---

    /// Connectors touching `zone`. Empty for an unknown index.
    #[inline]
    pub fn connectors_of(&self, zone: ZoneIndex) -> &[ConnectorIndex] {
        self.links
            .get(zone.get())
            .map(|l| l.connectors.as_slice())
            .unwrap_or(&[])
    }

    /// Zones whose bounds overlap `zone`. Empty for an unknown index.
    #[inline]
    pub fn neighbors_of(&self, zone: ZoneIndex) -> &[ZoneIndex] {
        self.links
            .get(zone.get())
            .map(|l| l.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `a` and `b` are joined by a connector or by overlap.
    pub fn are_adjacent(&self, a: ZoneIndex, b: ZoneIndex) -> bool {
        self.neighbors_of(a).contains(&b)
            || self
                .connectors_of(a)
                .iter()
                .any(|&c| self.connectors[c.get()].other(a) == b)
    }
}

fn ordered_pair(a: ZoneIndex, b: ZoneIndex) -> (u32, u32) {
    if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) }
}

fn vec_of_default_links(n: usize) -> Vec<ZoneLinks> {
    let mut links = Vec::with_capacity(n);
    links.resize_with(n, ZoneLinks::default);
    links
}

/// Highest zone id not already used by an authored zone.
fn free_zone_id(taken: &BTreeMap<ZoneId, ZoneIndex>) -> Option<ZoneId> {
    (0..=u32::MAX)
        .rev()
        .map(ZoneId)
        .find(|id| !taken.contains_key(id))
}
