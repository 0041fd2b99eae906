//! Zone transition events.
//!
//! Whenever an emitter or listener resolves to a different zone, the world
//! queues an [`ZoneEvent::Exited`] for the old zone followed by a
//! [`ZoneEvent::Entered`] for the new one. Collaborators drain the queue at
//! their own pace; nothing holds a subscription.

use std::collections::VecDeque;

use roomtone_core::{EmitterId, ListenerId, ZoneId};

/// Who changed zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneSubject {
    /// A registered emitter.
    Emitter(EmitterId),
    /// A registered listener.
    Listener(ListenerId),
}

impl std::fmt::Display for ZoneSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emitter(id) => write!(f, "{id}"),
            Self::Listener(id) => write!(f, "{id}"),
        }
    }
}

/// A zone transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    /// `subject` left `zone`.
    Exited {
        /// Who moved.
        subject: ZoneSubject,
        /// The zone left behind.
        zone: ZoneId,
    },
    /// `subject` entered `zone`.
    Entered {
        /// Who moved.
        subject: ZoneSubject,
        /// The zone entered.
        zone: ZoneId,
    },
}

impl ZoneEvent {
    /// The entity that moved.
    pub fn subject(&self) -> ZoneSubject {
        match *self {
            Self::Exited { subject, .. } | Self::Entered { subject, .. } => subject,
        }
    }

    /// The zone involved.
    pub fn zone(&self) -> ZoneId {
        match *self {
            Self::Exited { zone, .. } | Self::Entered { zone, .. } => zone,
        }
    }
}

/// Events held before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 4096;

/// Bounded FIFO of pending zone events.
///
/// When full, the oldest event is dropped to make room; the first drop since
/// the last drain is logged at `warn`.
#[derive(Debug, Clone)]
pub struct ZoneEventQueue {
    events: VecDeque<ZoneEvent>,
    capacity: usize,
    dropped: u64,
    dropped_since_drain: u64,
}

impl Default for ZoneEventQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl ZoneEventQueue {
    /// Creates an empty queue holding up to [`DEFAULT_EVENT_CAPACITY`] events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue holding up to `capacity` events (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
            dropped_since_drain: 0,
        }
    }

    /// Records a move from `from` to `to`. Nothing is queued when the zone
    /// did not change; `from` is `None` for a first resolution.
    pub fn record(&mut self, subject: ZoneSubject, from: Option<ZoneId>, to: ZoneId) {
        if from == Some(to) {
            return;
        }
        if let Some(zone) = from {
            self.push(ZoneEvent::Exited { subject, zone });
        }
        self.push(ZoneEvent::Entered { subject, zone: to });
    }

    /// Records that `subject` left `zone` for good (unregistered).
    pub fn record_exit(&mut self, subject: ZoneSubject, zone: ZoneId) {
        self.push(ZoneEvent::Exited { subject, zone });
    }

    fn push(&mut self, event: ZoneEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
            self.dropped += 1;
            self.dropped_since_drain += 1;
            if self.dropped_since_drain == 1 {
                tracing::warn!(
                    capacity = self.capacity,
                    "zone event queue full, dropping oldest events until drained"
                );
            }
        }
        self.events.push_back(event);
    }

    /// Removes and yields all pending events, oldest first.
    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, ZoneEvent> {
        self.dropped_since_drain = 0;
        self.events.drain(..)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of pending events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped because the queue was full, over its lifetime.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
