//! Path cache keyed by `(source zone, listener zone)`.
//!
//! An entry stays valid while both zones are unchanged and the listener has
//! moved no more than a squared-distance threshold since the entry was
//! computed. Anything else is a miss: the caller's compute closure runs and
//! its result replaces the entry, reusing the entry's path buffer.
//!
//! Entries hold dense [`ZoneIndex`] values, which are only meaningful for one
//! graph epoch. Call [`PathCache::invalidate_all`] on every rebuild.

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use crate::math::Vec3;
use crate::zone::ZoneIndex;

/// Listener displacement (squared) tolerated before a path is recomputed.
pub const REPATH_DISTANCE_SQ: f32 = 0.25;

/// A cached search result.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPath {
    /// Zone the emitter was in.
    pub source_zone: ZoneIndex,
    /// Zone the listener was in.
    pub listener_zone: ZoneIndex,
    /// Zones from source to listener. Empty when unreachable.
    pub path: Vec<ZoneIndex>,
    /// Occlusion computed for `path`, or `None` when unreachable.
    pub occlusion: Option<f32>,
    /// Listener position used for the computation.
    pub listener_position: Vec3,
    /// Monotonic computation serial, unique per cache. Equal serials mean the
    /// same computation.
    pub serial: u64,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the compute closure.
    pub misses: u64,
}

/// Result of [`PathCache::get_or_compute`].
#[derive(Debug)]
pub struct CacheLookup<'a> {
    /// The (possibly fresh) entry.
    pub entry: &'a CachedPath,
    /// Whether the entry was reused.
    pub hit: bool,
}

/// Path cache for one emitter.
#[derive(Debug, Clone)]
pub struct PathCache {
    entries: BTreeMap<(ZoneIndex, ZoneIndex), CachedPath>,
    threshold_sq: f32,
    stats: CacheStats,
    serial: u64,
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(REPATH_DISTANCE_SQ)
    }
}

impl PathCache {
    /// Creates an empty cache with a custom displacement threshold.
    pub fn new(threshold_sq: f32) -> Self {
        Self {
            entries: BTreeMap::new(),
            threshold_sq,
            stats: CacheStats::default(),
            serial: 0,
        }
    }

    /// Squared displacement threshold.
    pub fn threshold_sq(&self) -> f32 {
        self.threshold_sq
    }

    /// Returns the entry for `(source, listener_zone)`, computing it on a miss.
    ///
    /// `force` bypasses the cache. `compute` receives a cleared path buffer to
    /// fill and returns the occlusion, or `None` when the listener is
    /// unreachable.
    ///
    /// # Errors
    ///
    /// Propagates the error of `compute`; the previous entry, if any, is
    /// removed in that case.
    pub fn get_or_compute<E, F>(
        &mut self,
        source: ZoneIndex,
        listener_zone: ZoneIndex,
        listener_pos: Vec3,
        force: bool,
        compute: F,
    ) -> Result<CacheLookup<'_>, E>
    where
        F: FnOnce(&mut Vec<ZoneIndex>) -> Result<Option<f32>, E>,
    {
        let key = (source, listener_zone);
        let fresh = !force
            && self.entries.get(&key).is_some_and(|e| {
                e.listener_position.distance_squared(listener_pos) <= self.threshold_sq
            });

        if fresh {
            self.stats.hits += 1;
            return Ok(CacheLookup {
                entry: &self.entries[&key],
                hit: true,
            });
        }

        self.stats.misses += 1;
        self.serial += 1;
        let serial = self.serial;

        let entry = self.entries.entry(key).or_insert_with(|| CachedPath {
            source_zone: source,
            listener_zone,
            path: Vec::new(),
            occlusion: None,
            listener_position: listener_pos,
            serial,
        });
        entry.path.clear();
        match compute(&mut entry.path) {
            Ok(occlusion) => {
                entry.occlusion = occlusion;
                entry.listener_position = listener_pos;
                entry.serial = serial;
                if occlusion.is_none() {
                    entry.path.clear();
                }
            }
            Err(e) => {
                self.entries.remove(&key);
                return Err(e);
            }
        }

        Ok(CacheLookup {
            entry: &self.entries[&key],
            hit: false,
        })
    }

    /// Looks up an entry without validating or computing it.
    pub fn get(&self, source: ZoneIndex, listener_zone: ZoneIndex) -> Option<&CachedPath> {
        self.entries.get(&(source, listener_zone))
    }

    /// Drops every entry. Required whenever the graph is rebuilt or a
    /// connector changes state.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit/miss counters since creation or the last [`take_stats`](Self::take_stats).
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Returns and resets the hit/miss counters.
    pub fn take_stats(&mut self) -> CacheStats {
        core::mem::take(&mut self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    fn z(i: u32) -> ZoneIndex {
        ZoneIndex::from_raw(i)
    }

    fn fill(occ: f32) -> impl FnOnce(&mut Vec<ZoneIndex>) -> Result<Option<f32>, Infallible> {
        move |path| {
            path.extend([z(0), z(1)]);
            Ok(Some(occ))
        }
    }

    #[test]
    fn small_displacement_hits() {
        let mut cache = PathCache::default();
        let first = cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, fill(10.0))
            .unwrap()
            .entry
            .serial;

        let lookup = cache
            .get_or_compute(z(0), z(1), Vec3::new(0.3, 0.0, 0.0), false, fill(99.0))
            .unwrap();
        assert!(lookup.hit);
        assert_eq!(lookup.entry.serial, first);
        assert_eq!(lookup.entry.occlusion, Some(10.0));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut cache = PathCache::default();
        cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, fill(1.0))
            .unwrap();
        let lookup = cache
            .get_or_compute(z(0), z(1), Vec3::new(0.5, 0.0, 0.0), false, fill(2.0))
            .unwrap();
        assert!(lookup.hit);
    }

    #[test]
    fn large_displacement_recomputes() {
        let mut cache = PathCache::default();
        cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, fill(1.0))
            .unwrap();
        let lookup = cache
            .get_or_compute(z(0), z(1), Vec3::new(0.6, 0.0, 0.0), false, fill(2.0))
            .unwrap();
        assert!(!lookup.hit);
        assert_eq!(lookup.entry.occlusion, Some(2.0));
        assert_eq!(lookup.entry.listener_position, Vec3::new(0.6, 0.0, 0.0));
    }

    #[test]
    fn zone_change_is_a_different_key() {
        let mut cache = PathCache::default();
        cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, fill(1.0))
            .unwrap();
        let lookup = cache
            .get_or_compute(z(0), z(2), Vec3::ZERO, false, fill(2.0))
            .unwrap();
        assert!(!lookup.hit);
        let lookup = cache
            .get_or_compute(z(3), z(1), Vec3::ZERO, false, fill(3.0))
            .unwrap();
        assert!(!lookup.hit);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn keys_are_ordered_pairs() {
        let mut cache = PathCache::default();
        cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, fill(1.0))
            .unwrap();
        assert!(cache.get(z(1), z(0)).is_none());
    }

    #[test]
    fn force_bypasses() {
        let mut cache = PathCache::default();
        cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, fill(1.0))
            .unwrap();
        let lookup = cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, true, fill(5.0))
            .unwrap();
        assert!(!lookup.hit);
        assert_eq!(lookup.entry.occlusion, Some(5.0));
    }

    #[test]
    fn unreachable_is_cached_with_empty_path() {
        let mut cache = PathCache::default();
        let lookup = cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, |path| {
                path.push(z(0));
                Ok::<_, Infallible>(None)
            })
            .unwrap();
        assert_eq!(lookup.entry.occlusion, None);
        assert!(lookup.entry.path.is_empty());
    }

    #[test]
    fn compute_error_drops_the_entry() {
        let mut cache = PathCache::default();
        cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, fill(1.0))
            .unwrap();
        let err = cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, true, |_| Err("boom"))
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_all_clears() {
        let mut cache = PathCache::default();
        cache
            .get_or_compute(z(0), z(1), Vec3::ZERO, false, fill(1.0))
            .unwrap();
        cache.invalidate_all();
        assert!(cache.is_empty());
        assert_eq!(cache.take_stats().misses, 1);
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
