//! Per-emitter interpolation state, advanced once per tick.
//!
//! Each fade stores where it started, where it is heading, and how long it
//! has been running. There are no timers or callbacks: the world calls
//! `advance` with the tick period and forwards the result to the sink.

use std::time::Duration;

use roomtone_core::{lerp, smoothstep};

/// Eased transition of an emitter's applied occlusion.
///
/// A new target restarts the ease from the currently applied value. The
/// first target after [`arm_snap`](Self::arm_snap) is applied immediately,
/// so a sound that starts playing does not fade in from stale occlusion.
#[derive(Debug, Clone)]
pub struct OcclusionFade {
    applied: f32,
    start: f32,
    target: f32,
    elapsed: f32,
    duration: f32,
    snap_next: bool,
}

impl OcclusionFade {
    /// Creates a settled fade at `initial`.
    pub fn new(initial: f32, duration_secs: f32) -> Self {
        Self {
            applied: initial,
            start: initial,
            target: initial,
            elapsed: 0.0,
            duration: duration_secs.max(0.0),
            snap_next: true,
        }
    }

    /// Makes the next [`set_target`](Self::set_target) jump straight to its value.
    pub fn arm_snap(&mut self) {
        self.snap_next = true;
    }

    /// Sets a new target.
    pub fn set_target(&mut self, target: f32) {
        if self.snap_next {
            self.snap_next = false;
            self.set_immediate(target);
            return;
        }
        if target == self.target {
            return;
        }
        self.start = self.applied;
        self.target = target;
        self.elapsed = 0.0;
    }

    /// Jumps to `value` with no easing.
    pub fn set_immediate(&mut self, value: f32) {
        self.applied = value;
        self.start = value;
        self.target = value;
        self.elapsed = self.duration;
    }

    /// Advances by `dt` and returns the applied value.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        if self.is_settled() {
            self.applied = self.target;
            return self.applied;
        }
        self.elapsed = (self.elapsed + dt.as_secs_f32()).min(self.duration);
        let t = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            1.0
        };
        self.applied = lerp(self.start, self.target, smoothstep(t));
        self.applied
    }

    /// Currently applied value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.applied
    }

    /// Value being eased towards.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the applied value has reached the target.
    pub fn is_settled(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Crossfade between two reverb presets after a zone change.
#[derive(Debug, Clone, Default)]
pub struct ReverbFade {
    from: Option<String>,
    to: Option<String>,
    elapsed: f32,
    duration: f32,
}

impl ReverbFade {
    /// Creates a fade with no preset.
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration: duration_secs.max(0.0),
            ..Self::default()
        }
    }

    /// Starts a crossfade from the current preset to `preset`. A change to
    /// the same preset is ignored. Returns whether a fade started.
    pub fn change_to(&mut self, preset: Option<&str>) -> bool {
        if self.to.as_deref() == preset {
            return false;
        }
        self.from = self.to.take();
        self.to = preset.map(str::to_owned);
        self.elapsed = 0.0;
        true
    }

    /// Jumps to `preset` with no crossfade.
    pub fn set_immediate(&mut self, preset: Option<&str>) {
        self.from = None;
        self.to = preset.map(str::to_owned);
        self.elapsed = self.duration;
    }

    /// Advances by `dt` and returns the mix of the new preset in `[0, 1]`.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt.as_secs_f32()).min(self.duration);
        self.mix()
    }

    /// Mix of the new preset in `[0, 1]`.
    pub fn mix(&self) -> f32 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Whether a crossfade is still running.
    pub fn is_active(&self) -> bool {
        self.elapsed < self.duration
    }

    /// Preset being faded out.
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Preset being faded in.
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn first_target_snaps() {
        let mut fade = OcclusionFade::new(0.0, 0.5);
        fade.set_target(40.0);
        assert_eq!(fade.value(), 40.0);
        assert_eq!(fade.advance(TICK), 40.0);
    }

    #[test]
    fn later_targets_ease() {
        let mut fade = OcclusionFade::new(0.0, 0.4);
        fade.set_target(0.0);
        fade.set_target(100.0);

        let mut values = Vec::new();
        for _ in 0..4 {
            values.push(fade.advance(TICK));
        }
        assert!(values.windows(2).all(|w| w[1] > w[0]), "{values:?}");
        assert!((values[1] - 50.0).abs() < 1e-3, "midpoint {values:?}");
        assert!((values[3] - 100.0).abs() < 1e-3);
        assert!(fade.is_settled());
    }

    #[test]
    fn retarget_restarts_from_applied() {
        let mut fade = OcclusionFade::new(0.0, 1.0);
        fade.set_target(0.0);
        fade.set_target(100.0);
        let mid = fade.advance(Duration::from_millis(500));
        fade.set_target(0.0);
        let next = fade.advance(Duration::from_millis(1));
        assert!(next <= mid && next > 0.0);
    }

    #[test]
    fn arm_snap_applies_next_target_instantly() {
        let mut fade = OcclusionFade::new(0.0, 1.0);
        fade.set_target(10.0);
        fade.set_target(80.0);
        fade.arm_snap();
        fade.set_target(20.0);
        assert_eq!(fade.value(), 20.0);
        assert!(fade.is_settled());
    }

    #[test]
    fn zero_duration_is_instant() {
        let mut fade = OcclusionFade::new(0.0, 0.0);
        fade.set_target(1.0);
        fade.set_target(9.0);
        assert_eq!(fade.advance(TICK), 9.0);
    }

    #[test]
    fn reverb_crossfade_runs_to_completion() {
        let mut fade = ReverbFade::new(0.45);
        fade.set_immediate(Some("hall"));
        assert!(!fade.is_active());
        assert!(fade.change_to(Some("closet")));
        assert_eq!(fade.from(), Some("hall"));
        assert_eq!(fade.to(), Some("closet"));

        let mut mix = 0.0;
        for _ in 0..5 {
            mix = fade.advance(TICK);
        }
        assert_eq!(mix, 1.0);
        assert!(!fade.is_active());
    }

    #[test]
    fn reverb_same_preset_is_ignored() {
        let mut fade = ReverbFade::new(0.45);
        fade.set_immediate(Some("hall"));
        assert!(!fade.change_to(Some("hall")));
        assert!(!fade.is_active());
    }
}
