//! Engine error type.

use roomtone_core::{BuildError, EmitterId, ListenerId, QueryError, SearchError};
use thiserror::Error;

/// Errors surfaced by [`PropagationWorld`](crate::PropagationWorld) and the
/// [`Scheduler`](crate::Scheduler).
///
/// Unreachable listeners, cache misses, and tick overruns are not errors;
/// they are handled inside the tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A graph rebuild was rejected. The previous graph is still active.
    #[error("graph build failed: {0}")]
    Build(#[from] BuildError),

    /// The search scratch space cannot hold the graph.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// A query named a zone or connector that does not exist.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// No graph has been built yet.
    #[error("no zone graph has been built")]
    NoGraph,

    /// The emitter handle is not registered.
    #[error("unknown emitter {0}")]
    UnknownEmitter(EmitterId),

    /// The listener handle is not registered.
    #[error("unknown listener {0}")]
    UnknownListener(ListenerId),
}
