//! Fixed-rate tick driver.
//!
//! The host calls [`Scheduler::poll`] with a monotonic timestamp as often as
//! it likes; the scheduler runs at most one tick per call once the next tick
//! is due. A tick that takes longer than the period is reported as an overrun
//! and the schedule jumps forward instead of queuing catch-up ticks.

use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::sink::AudioSink;
use crate::world::{PropagationWorld, TickStats};

/// Summary of one executed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Zero-based tick number.
    pub tick: u64,
    /// Emitters that ran a propagation pass.
    pub emitters_propagated: usize,
    /// Listener paths answered from cache.
    pub cache_hits: u64,
    /// Listener paths searched.
    pub cache_misses: u64,
    /// Wall time spent in the tick.
    pub elapsed: Duration,
    /// Whether the tick took longer than the period.
    pub overrun: bool,
}

/// Drives [`PropagationWorld::tick`] at a fixed rate.
#[derive(Debug, Clone)]
pub struct Scheduler {
    period: Duration,
    next_tick: Duration,
    tick_index: u64,
    overruns: u64,
}

impl Scheduler {
    /// Creates a scheduler whose first tick is due at time zero.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_micros(1)),
            next_tick: Duration::ZERO,
            tick_index: 0,
            overruns: 0,
        }
    }

    /// Creates a scheduler running at the configured tick rate.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.tick_period())
    }

    /// Time between ticks.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Timestamp at which the next tick is due.
    pub fn next_due(&self) -> Duration {
        self.next_tick
    }

    /// Number of ticks executed.
    pub fn ticks(&self) -> u64 {
        self.tick_index
    }

    /// Number of ticks that overran the period.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Whether a tick is due at `now`.
    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.next_tick
    }

    /// Runs a tick if one is due at `now`, timing it with the wall clock.
    ///
    /// Returns `Ok(None)` when no tick is due.
    pub fn poll(
        &mut self,
        world: &mut PropagationWorld,
        sink: &mut dyn AudioSink,
        now: Duration,
    ) -> Result<Option<TickReport>, EngineError> {
        if !self.is_due(now) {
            return Ok(None);
        }
        let started = Instant::now();
        let stats = world.tick(self.period, sink)?;
        Ok(Some(self.finish(now, started.elapsed(), stats)))
    }

    /// Books a tick that ran at `now` and took `elapsed`, advancing the
    /// schedule. Exposed so hosts with their own clock can drive the
    /// scheduler deterministically.
    pub fn finish(
        &mut self,
        now: Duration,
        elapsed: Duration,
        stats: TickStats,
    ) -> TickReport {
        let overrun = elapsed > self.period;
        if overrun {
            self.overruns += 1;
            tracing::warn!(
                tick = self.tick_index,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                period_ms = self.period.as_secs_f64() * 1000.0,
                "propagation tick overran its period"
            );
        }

        let report = TickReport {
            tick: self.tick_index,
            emitters_propagated: stats.propagated,
            cache_hits: stats.cache_hits,
            cache_misses: stats.cache_misses,
            elapsed,
            overrun,
        };

        self.tick_index += 1;
        self.next_tick += self.period;
        let finished = now + elapsed;
        if self.next_tick <= finished {
            self.next_tick = finished + self.period;
        }
        report
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
