//! Error taxonomy for graph construction, search, and queries.
//!
//! An unreachable target is *not* an error: [`PathSearch::find_path`]
//! reports it as `Ok(None)` and the caller applies its fallback occlusion.
//!
//! [`PathSearch::find_path`]: crate::PathSearch::find_path

use thiserror::Error;

use crate::connector::ConnectorId;
use crate::zone::ZoneId;

/// Which fixed bound was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityKind {
    /// Zone count bound.
    Zones,
    /// Connector count bound.
    Connectors,
}

impl core::fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Zones => f.write_str("zones"),
            Self::Connectors => f.write_str("connectors"),
        }
    }
}

/// Errors that abort a graph build. The previous graph epoch is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No zones were supplied.
    #[error("zone list is empty")]
    EmptyZoneList,

    /// More zones or connectors than the fixed bound.
    #[error("too many {kind}: {count} exceeds capacity {capacity}")]
    CapacityExceeded {
        /// Which bound.
        kind: CapacityKind,
        /// Number requested, including a synthesized global zone.
        count: usize,
        /// The configured bound.
        capacity: usize,
    },

    /// Two zones share an identity.
    #[error("duplicate zone id {0}")]
    DuplicateZone(ZoneId),

    /// Two connectors share an identity.
    #[error("duplicate connector id {0}")]
    DuplicateConnector(ConnectorId),

    /// More than one zone is flagged global.
    #[error("more than one zone is flagged global ({first} and {second})")]
    MultipleGlobalZones {
        /// The first global zone found.
        first: ZoneId,
        /// The second global zone found.
        second: ZoneId,
    },

    /// No global zone was authored and none could be synthesized.
    #[error("no global zone authored and none can be synthesized: {reason}")]
    NoGlobalZone {
        /// Why synthesis failed.
        reason: &'static str,
    },
}

/// Errors raised by [`PathSearch`](crate::PathSearch) and its priority queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The graph has more zones than the search scratch space holds.
    #[error("graph has {zones} zones but search capacity is {capacity}")]
    CapacityExceeded {
        /// Zones in the graph.
        zones: usize,
        /// Scratch capacity.
        capacity: usize,
    },

    /// An item index outside the queue's fixed key space.
    #[error("priority queue item {item} outside capacity {capacity}")]
    QueueOverflow {
        /// Offending item.
        item: usize,
        /// Queue capacity.
        capacity: usize,
    },
}

/// A query referenced something that does not exist in the current epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Unknown zone identity.
    #[error("unknown zone {0}")]
    UnknownZone(ZoneId),

    /// Unknown connector identity.
    #[error("unknown connector {0}")]
    UnknownConnector(ConnectorId),
}
