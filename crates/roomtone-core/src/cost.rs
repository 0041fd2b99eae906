//! Connector traversal cost.
//!
//! ```text
//! base  = open ? open_cost : closed_cost
//! dist  = source_blend * |source - connector| + listener_blend * |listener - connector|
//! range = clamp01(dist / long_range) * distance_weight
//! freq  = (open ? 1 : closed_frequency_factor) * frequency_weight
//! cost  = clamp(base + range + freq + connector.weight, min_cost, max_cost)
//! ```
//!
//! Closed connectors cost strictly more than open ones at equal distance, and
//! cost never decreases as either endpoint moves away from the connector.

use crate::connector::Connector;
use crate::math::{Vec3, clamp01};

/// Cost assigned to an overlap neighbor that no connector joins.
pub const FALLBACK_EDGE_COST: f32 = 1.0;

/// Tunables of the traversal cost function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Base penalty for an open connector.
    pub open_cost: f32,
    /// Base penalty for a closed connector. Must exceed `open_cost`.
    pub closed_cost: f32,
    /// Weight of the normalized distance term.
    pub distance_weight: f32,
    /// Weight of the frequency term.
    pub frequency_weight: f32,
    /// Frequency multiplier applied to closed connectors.
    pub closed_frequency_factor: f32,
    /// Distance at which the range term saturates.
    pub long_range: f32,
    /// Share of the source-to-connector distance in the blend.
    pub source_blend: f32,
    /// Share of the listener-to-connector distance in the blend.
    pub listener_blend: f32,
    /// Lower clamp.
    pub min_cost: f32,
    /// Upper clamp.
    pub max_cost: f32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            open_cost: 1.0,
            closed_cost: 4.0,
            distance_weight: 1.0,
            frequency_weight: 0.7,
            closed_frequency_factor: 1.25,
            long_range: 20.0,
            source_blend: 0.4,
            listener_blend: 0.6,
            min_cost: 0.5,
            max_cost: 100.0,
        }
    }
}

impl CostModel {
    /// Traversal cost of `connector` for a source at `source_pos` heard at
    /// `listener_pos`.
    #[inline]
    pub fn cost(&self, connector: &Connector, source_pos: Vec3, listener_pos: Vec3) -> f32 {
        let open = connector.is_open();
        let base = if open { self.open_cost } else { self.closed_cost };

        let at = connector.position();
        let dist = self.source_blend * source_pos.distance(at)
            + self.listener_blend * listener_pos.distance(at);
        let range = if self.long_range > 0.0 {
            clamp01(dist / self.long_range) * self.distance_weight
        } else {
            self.distance_weight
        };

        let freq = if open {
            self.frequency_weight
        } else {
            self.closed_frequency_factor * self.frequency_weight
        };

        (base + range + freq + connector.weight()).clamp(self.min_cost, self.max_cost)
    }
}
