//! Position to zone resolution.
//!
//! Among all bounded zones containing a point, the one on the highest layer
//! wins. Equal layers keep the first match in index order. A point inside no
//! zone resolves to the global zone.

use crate::graph::ZoneGraph;
use crate::math::Vec3;
use crate::zone::{ZoneId, ZoneIndex};

impl ZoneGraph {
    /// Returns the zone owning `position`.
    ///
    /// Read-only and allocation-free; O(zones).
    pub fn resolve(&self, position: Vec3) -> ZoneIndex {
        let mut best: Option<(i32, ZoneIndex)> = None;
        for zone in self.zones() {
            if zone.is_global() {
                continue;
            }
            let Some(bounds) = zone.bounds() else {
                continue;
            };
            if !bounds.contains_point(position) {
                continue;
            }
            match best {
                Some((layer, _)) if zone.layer() <= layer => {}
                _ => best = Some((zone.layer(), zone.index())),
            }
        }
        best.map_or(self.global_zone(), |(_, index)| index)
    }

    /// Stable id of the zone owning `position`.
    pub fn get_current_zone(&self, position: Vec3) -> ZoneId {
        let index = self.resolve(position);
        self.zones()[index.get()].id()
    }
}
