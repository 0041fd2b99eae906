//! Folds a found path into one occlusion scalar in `[0, MAX_OCCLUSION]`.
//!
//! Walking hop by hop from the source, every *closed* connector at or past
//! the emitter's `portal_offset` contributes
//!
//! ```text
//! distance_weight = clamp01(|listener - connector|² / aggression) * influence + 1
//! depth_weight    = clamp01(1 - (step - 1) / max_depth)
//! contribution    = occlusion_amount * distance_weight * depth_weight * blockability
//! ```
//!
//! where `step` counts connector hops walked so far (overlap hops do not
//! advance it). The walk stops at the listener's zone, after `max_depth`
//! hops, or as soon as the running total reaches the cap.

use crate::connector::ConnectorIndex;
use crate::graph::ZoneGraph;
use crate::math::{Vec3, clamp01};
use crate::zone::ZoneIndex;

/// Upper bound of every occlusion value.
pub const MAX_OCCLUSION: f32 = 255.0;

/// Per-emitter parameters of the reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionParams {
    /// Closed connectors skipped before accumulation starts.
    pub portal_offset: usize,
    /// Hop limit; also the span of the depth falloff.
    pub max_depth: usize,
    /// Emitter multiplier on every contribution.
    pub blockability: f32,
}

impl Default for OcclusionParams {
    fn default() -> Self {
        Self {
            portal_offset: 0,
            max_depth: crate::search::DEFAULT_MAX_DEPTH,
            blockability: 1.0,
        }
    }
}

/// Reduces `path` (with its per-hop `edges`) to an occlusion value.
///
/// `edges[i]` is the connector crossed from `path[i]` to `path[i + 1]`, as
/// produced by [`PathSearch`](crate::PathSearch).
pub fn reduce(
    graph: &ZoneGraph,
    path: &[ZoneIndex],
    edges: &[Option<ConnectorIndex>],
    listener_zone: ZoneIndex,
    listener_pos: Vec3,
    params: &OcclusionParams,
) -> f32 {
    let max_depth = params.max_depth.max(1);
    let hops = edges.len().min(path.len().saturating_sub(1)).min(max_depth);

    let mut total = 0.0_f32;
    let mut step = 1_usize;
    let mut closed_seen = 0_usize;

    for i in 0..hops {
        if path[i] == listener_zone {
            break;
        }
        let Some(connector) = edges[i].and_then(|c| graph.connector(c)) else {
            continue;
        };

        if !connector.is_open() {
            let counted = closed_seen >= params.portal_offset;
            closed_seen += 1;
            if counted {
                let blocking = connector.blocking();
                let dist_sq = listener_pos.distance_squared(connector.position());
                let falloff = if blocking.aggression > 0.0 {
                    clamp01(dist_sq / blocking.aggression)
                } else {
                    1.0
                };
                let distance_weight = falloff * blocking.influence + 1.0;
                let depth_weight = clamp01(1.0 - (step as f32 - 1.0) / max_depth as f32);

                total += blocking.occlusion_amount
                    * distance_weight
                    * depth_weight
                    * params.blockability;

                if total >= MAX_OCCLUSION {
                    total = MAX_OCCLUSION;
                    break;
                }
            }
        }
        step += 1;
    }

    if total.is_nan() {
        0.0
    } else {
        total.clamp(0.0, MAX_OCCLUSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{Blocking, ConnectorDesc};
    use crate::cost::CostModel;
    use crate::graph::GraphLimits;
    use crate::math::Aabb;
    use crate::search::{PathSearch, SearchParams};
    use crate::zone::{ZoneDesc, ZoneId};

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    fn room(id: u32) -> ZoneDesc {
        let x = id as f32 * 10.0;
        ZoneDesc::new(
            id,
            "room",
            Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 4.0, 3.0, 4.0)),
        )
    }

    fn blocking(amount: f32) -> Blocking {
        Blocking {
            occlusion_amount: amount,
            ..Blocking::default()
        }
    }

    /// Chain 1-2-...-n with the given closed/open states per hop.
    fn chain(open: &[bool], amount: f32) -> ZoneGraph {
        let zones: Vec<ZoneDesc> = (1..=open.len() as u32 + 1).map(room).collect();
        let doors: Vec<ConnectorDesc> = open
            .iter()
            .enumerate()
            .map(|(i, &o)| {
                let a = i as u32 + 1;
                ConnectorDesc::new(a, "door", a, a + 1, Vec3::new(a as f32 * 10.0 + 5.0, 0.0, 0.0))
                    .with_open(o)
                    .with_blocking(blocking(amount))
            })
            .collect();
        ZoneGraph::build(&zones, &doors, GraphLimits::default()).unwrap()
    }

    fn reduce_chain(graph: &ZoneGraph, listener_pos: Vec3, params: &OcclusionParams) -> f32 {
        let mut search = PathSearch::new(64);
        let first = graph.index_of(ZoneId(1)).unwrap();
        let last = ZoneIndex::from_raw(graph.zone_count() as u32 - 2);
        let search_params = SearchParams {
            max_depth: 64,
            max_cost: f32::MAX,
            ..SearchParams::default()
        };
        search
            .find_path(graph, &CostModel::default(), first, last, &search_params)
            .unwrap()
            .unwrap();
        reduce(graph, search.path(), search.edges(), last, listener_pos, params)
    }

    #[test]
    fn all_open_is_silent() {
        let graph = chain(&[true, true], 50.0);
        let occ = reduce_chain(&graph, Vec3::new(30.0, 0.0, 0.0), &OcclusionParams::default());
        assert_eq!(occ, 0.0);
    }

    #[test]
    fn closed_second_hop_is_depth_weighted() {
        let graph = chain(&[true, false], 50.0);
        // Listener sits on the closed door: distance weight is exactly 1.
        let occ = reduce_chain(&graph, Vec3::new(25.0, 0.0, 0.0), &OcclusionParams::default());
        // step 2 of 10: depth weight 0.9
        assert!((occ - 45.0).abs() < 1e-4, "got {occ}");
    }

    #[test]
    fn distance_weight_saturates() {
        let graph = chain(&[false], 10.0);
        // |listener - door|² = 100 > aggression 25, so weight = 1 * 2 + 1.
        let occ = reduce_chain(&graph, Vec3::new(25.0, 0.0, 0.0), &OcclusionParams::default());
        assert!((occ - 30.0).abs() < 1e-4, "got {occ}");
    }

    #[test]
    fn offset_skips_leading_closed_connectors() {
        let graph = chain(&[false], 50.0);
        let params = OcclusionParams {
            portal_offset: 1,
            ..OcclusionParams::default()
        };
        assert_eq!(reduce_chain(&graph, Vec3::new(15.0, 0.0, 0.0), &params), 0.0);

        let graph = chain(&[false, false], 50.0);
        let occ = reduce_chain(&graph, Vec3::new(25.0, 0.0, 0.0), &params);
        assert!((occ - 45.0).abs() < 1e-4, "got {occ}");
    }

    #[test]
    fn blockability_scales_linearly() {
        let graph = chain(&[false], 10.0);
        let params = OcclusionParams {
            blockability: 0.5,
            ..OcclusionParams::default()
        };
        let occ = reduce_chain(&graph, Vec3::new(15.0, 0.0, 0.0), &params);
        assert!((occ - 5.0).abs() < 1e-4, "got {occ}");
    }

    #[test]
    fn many_closed_connectors_hit_the_cap() {
        let open = [false; 60];
        let graph = chain(&open, 200.0);
        let params = OcclusionParams {
            max_depth: 64,
            ..OcclusionParams::default()
        };
        let occ = reduce_chain(&graph, Vec3::new(0.0, 0.0, 0.0), &params);
        assert_eq!(occ, MAX_OCCLUSION);
    }

    #[test]
    fn walk_stops_at_listener_zone() {
        let graph = chain(&[true, false], 50.0);
        let mut search = PathSearch::new(8);
        let a = graph.index_of(ZoneId(1)).unwrap();
        let c = graph.index_of(ZoneId(3)).unwrap();
        let b = graph.index_of(ZoneId(2)).unwrap();
        search
            .find_path(&graph, &CostModel::default(), a, c, &SearchParams::default())
            .unwrap()
            .unwrap();
        let occ = reduce(
            &graph,
            search.path(),
            search.edges(),
            b,
            Vec3::ZERO,
            &OcclusionParams::default(),
        );
        assert_eq!(occ, 0.0);
    }

    #[test]
    fn negative_amounts_clamp_to_zero() {
        let graph = chain(&[false], -40.0);
        let occ = reduce_chain(&graph, Vec3::new(15.0, 0.0, 0.0), &OcclusionParams::default());
        assert_eq!(occ, 0.0);
    }
}
