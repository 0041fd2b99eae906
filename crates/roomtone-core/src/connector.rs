//! Connector ("portal") types for the propagation graph.
//!
//! A connector is an undirected opening between two zones: a doorway, a vent,
//! a window. Its openness can be toggled at runtime; the occlusion parameters
//! describe how strongly a *closed* connector blocks sound.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::math::Vec3;
use crate::zone::{ZoneId, ZoneIndex};

/// Stable connector identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectorId(pub u32);

impl core::fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ConnectorId({})", self.0)
    }
}

/// Dense connector index, valid for one graph epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectorIndex(pub(crate) u32);

impl ConnectorIndex {
    /// Returns the raw index as `usize`.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// How strongly a closed connector blocks sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blocking {
    /// Flat occlusion contributed by the connector when closed.
    pub occlusion_amount: f32,
    /// Squared-distance scale of the listener distance falloff.
    /// Larger values make distance matter less.
    pub aggression: f32,
    /// Extra weight applied once the listener is at or beyond `aggression`.
    pub influence: f32,
}

impl Default for Blocking {
    fn default() -> Self {
        Self {
            occlusion_amount: 0.1,
            aggression: 25.0,
            influence: 2.0,
        }
    }
}

/// Authoring-side description of a connector.
///
/// Endpoints are optional: a missing or unknown endpoint is redirected to the
/// global zone when the graph is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorDesc {
    /// Stable identity.
    pub id: ConnectorId,
    /// Human-readable name.
    pub name: String,
    /// First endpoint zone.
    pub zone_a: Option<ZoneId>,
    /// Second endpoint zone.
    pub zone_b: Option<ZoneId>,
    /// World-space position of the opening.
    pub position: Vec3,
    /// Initial openness.
    pub open: bool,
    /// Static traversal weight added to the cost.
    pub weight: f32,
    /// Occlusion parameters.
    pub blocking: Blocking,
    /// Disabled connectors are ignored by the builder.
    pub enabled: bool,
}

impl ConnectorDesc {
    /// Creates an open, enabled connector between two zones.
    pub fn new(id: u32, name: impl Into<String>, a: u32, b: u32, position: Vec3) -> Self {
        Self {
            id: ConnectorId(id),
            name: name.into(),
            zone_a: Some(ZoneId(a)),
            zone_b: Some(ZoneId(b)),
            position,
            open: true,
            weight: 0.0,
            blocking: Blocking::default(),
            enabled: true,
        }
    }

    /// Sets the initial openness.
    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Sets the occlusion parameters.
    pub fn with_blocking(mut self, blocking: Blocking) -> Self {
        self.blocking = blocking;
        self
    }

    /// Sets the static weight.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

/// A connector frozen into a built graph. Both endpoints are always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub(crate) id: ConnectorId,
    pub(crate) index: ConnectorIndex,
    pub(crate) name: String,
    pub(crate) zones: [ZoneIndex; 2],
    pub(crate) position: Vec3,
    pub(crate) open: bool,
    pub(crate) weight: f32,
    pub(crate) blocking: Blocking,
}

impl Connector {
    /// Stable identity.
    #[inline]
    pub fn id(&self) -> ConnectorId {
        self.id
    }

    /// Dense index for the current epoch.
    #[inline]
    pub fn index(&self) -> ConnectorIndex {
        self.index
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Both endpoint zones.
    #[inline]
    pub fn zones(&self) -> [ZoneIndex; 2] {
        self.zones
    }

    /// The endpoint opposite `from`. Returns `from` itself for a connector
    /// that does not touch it.
    #[inline]
    pub fn other(&self, from: ZoneIndex) -> ZoneIndex {
        if self.zones[0] == from {
            self.zones[1]
        } else {
            self.zones[0]
        }
    }

    /// Whether the connector joins a zone to itself.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.zones[0] == self.zones[1]
    }

    /// World-space position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current openness.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Static weight.
    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Occlusion parameters.
    #[inline]
    pub fn blocking(&self) -> &Blocking {
        &self.blocking
    }
}
