//! Emitter and listener descriptors consumed by propagation.

use crate::math::Vec3;
use crate::occlusion::OcclusionParams;
use crate::zone::ZoneId;

/// Handle of a registered emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmitterId(pub u32);

impl core::fmt::Display for EmitterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EmitterId({})", self.0)
    }
}

/// Handle of a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u32);

impl core::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

/// Propagation switches of one emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationSettings {
    /// Disabled emitters are never propagated.
    pub enabled: bool,
    /// Global emitters skip the graph and are always heard unoccluded.
    pub global: bool,
    /// Propagate again on every tick instead of once per start.
    pub repropagate: bool,
    /// Looping sounds propagate on every tick as well.
    pub looping: bool,
    /// Hop limit; `None` uses the engine default.
    pub max_depth: Option<usize>,
    /// Closed connectors ignored before occlusion accumulates.
    pub portal_offset: usize,
    /// Pins the emitter to a zone regardless of its position.
    pub zone_override: Option<ZoneId>,
}

impl Default for PropagationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            global: false,
            repropagate: false,
            looping: false,
            max_depth: None,
            portal_offset: 0,
            zone_override: None,
        }
    }
}

impl PropagationSettings {
    /// Whether a propagated emitter should propagate again next tick.
    #[inline]
    pub fn propagates_continuously(&self) -> bool {
        self.repropagate || self.looping
    }
}

/// A sound source as seen by propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterDesc {
    /// World position.
    pub position: Vec3,
    /// Propagation switches.
    pub settings: PropagationSettings,
    /// Multiplier on every connector's occlusion contribution.
    pub blockability: f32,
    /// Listeners farther away than this are not propagated to.
    /// `None` means unlimited.
    pub range_max: Option<f32>,
}

impl Default for EmitterDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            settings: PropagationSettings::default(),
            blockability: 1.0,
            range_max: None,
        }
    }
}

impl EmitterDesc {
    /// An emitter at `position` with default settings.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Whether a listener at `listener` is within range.
    #[inline]
    pub fn in_range(&self, listener: Vec3) -> bool {
        self.range_max
            .is_none_or(|r| self.position.distance_squared(listener) <= r * r)
    }

    /// Reduction parameters, using `default_depth` when no limit is set.
    pub fn occlusion_params(&self, default_depth: usize) -> OcclusionParams {
        OcclusionParams {
            portal_offset: self.settings.portal_offset,
            max_depth: self.settings.max_depth.unwrap_or(default_depth),
            blockability: self.blockability,
        }
    }
}

/// A listener as seen by propagation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ListenerDesc {
    /// World position.
    pub position: Vec3,
    /// Last zone the listener was resolved to.
    pub last_zone: Option<ZoneId>,
}

impl ListenerDesc {
    /// A listener at `position` with no known zone.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            last_zone: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_filter() {
        let mut e = EmitterDesc::at(Vec3::ZERO);
        assert!(e.in_range(Vec3::new(1000.0, 0.0, 0.0)));
        e.range_max = Some(5.0);
        assert!(e.in_range(Vec3::new(3.0, 4.0, 0.0)));
        assert!(!e.in_range(Vec3::new(3.0, 4.1, 0.0)));
    }

    #[test]
    fn occlusion_params_fall_back_to_default_depth() {
        let mut e = EmitterDesc::at(Vec3::ZERO);
        e.settings.portal_offset = 2;
        e.blockability = 0.5;
        let p = e.occlusion_params(10);
        assert_eq!(p.max_depth, 10);
        assert_eq!(p.portal_offset, 2);
        e.settings.max_depth = Some(3);
        assert_eq!(e.occlusion_params(10).max_depth, 3);
    }

    #[test]
    fn continuous_propagation() {
        let mut s = PropagationSettings::default();
        assert!(!s.propagates_continuously());
        s.looping = true;
        assert!(s.propagates_continuously());
    }
}
