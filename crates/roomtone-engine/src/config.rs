//! Engine tunables.

use std::time::Duration;

use roomtone_core::{
    CostModel, DEFAULT_CONNECTOR_CAPACITY, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PATH_COST,
    DEFAULT_ZONE_CAPACITY, GraphLimits, MAX_OCCLUSION, REPATH_DISTANCE_SQ,
};

/// Default tick rate in Hz.
pub const DEFAULT_TICK_HZ: f32 = 10.0;

/// Runtime configuration of a [`PropagationWorld`](crate::PropagationWorld).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Propagation passes per second.
    pub tick_hz: f32,
    /// Maximum zones per graph, including the global zone.
    pub zone_capacity: usize,
    /// Maximum enabled connectors per graph.
    pub connector_capacity: usize,
    /// Paths costing more than this are treated as unreachable.
    pub max_path_cost: f32,
    /// Hop limit for emitters that do not set their own.
    pub default_max_depth: usize,
    /// Listener displacement (squared) tolerated by the path cache.
    pub repath_distance_sq: f32,
    /// Scale applied to occlusion towards the primary listener before it
    /// drives the emitter's own occlusion parameter.
    pub primary_occlusion_scale: f32,
    /// Duration of the eased occlusion transition.
    pub occlusion_fade_secs: f32,
    /// Duration of the reverb crossfade on zone change.
    pub reverb_fade_secs: f32,
    /// Occlusion reported for unreachable listeners.
    pub unreachable_occlusion: f32,
    /// Connector traversal cost.
    pub cost: CostModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_hz: DEFAULT_TICK_HZ,
            zone_capacity: DEFAULT_ZONE_CAPACITY,
            connector_capacity: DEFAULT_CONNECTOR_CAPACITY,
            max_path_cost: DEFAULT_MAX_PATH_COST,
            default_max_depth: DEFAULT_MAX_DEPTH,
            repath_distance_sq: REPATH_DISTANCE_SQ,
            primary_occlusion_scale: 0.5,
            occlusion_fade_secs: 0.5,
            reverb_fade_secs: 0.45,
            unreachable_occlusion: MAX_OCCLUSION,
            cost: CostModel::default(),
        }
    }
}

impl EngineConfig {
    /// Time between ticks. Falls back to the default rate when `tick_hz` is
    /// not a positive finite number.
    pub fn tick_period(&self) -> Duration {
        let hz = if self.tick_hz.is_finite() && self.tick_hz > 0.0 {
            self.tick_hz
        } else {
            DEFAULT_TICK_HZ
        };
        Duration::from_secs_f64(1.0 / f64::from(hz))
    }

    /// Graph size bounds.
    pub fn graph_limits(&self) -> GraphLimits {
        GraphLimits {
            max_zones: self.zone_capacity,
            max_connectors: self.connector_capacity,
        }
    }
}
