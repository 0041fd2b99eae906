//! Emitter playback state machine.
//!
//! ```text
//!   Idle ──play──▶ Playing { propagated: false } ──tick──▶ Playing { propagated: true }
//!    ▲                        ▲                                      │
//!    └────────stop────────────┴──── tick, if repropagate or looping ─┘
//! ```

use roomtone_core::PropagationSettings;

/// Playback state of an emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterState {
    /// Not playing; never propagated.
    #[default]
    Idle,
    /// Playing. `propagated` is set once the current occlusion is known.
    Playing {
        /// Whether a propagation pass has run since the last reset.
        propagated: bool,
    },
}

impl EmitterState {
    /// Whether the emitter is playing.
    #[inline]
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    /// Start-of-tick transition: a propagated emitter that repropagates or
    /// loops goes back to `Playing { propagated: false }`.
    pub fn begin_tick(&mut self, settings: &PropagationSettings) {
        if *self == (Self::Playing { propagated: true }) && settings.propagates_continuously() {
            *self = Self::Playing { propagated: false };
        }
    }

    /// Whether this tick should run a propagation pass.
    pub fn wants_propagation(self, settings: &PropagationSettings) -> bool {
        settings.enabled && self == Self::Playing { propagated: false }
    }

    /// Marks the pass as done.
    pub fn mark_propagated(&mut self) {
        if self.is_playing() {
            *self = Self::Playing { propagated: true };
        }
    }
}
