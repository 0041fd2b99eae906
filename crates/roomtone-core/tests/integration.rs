//! Integration tests for roomtone-core.
//!
//! Drives the full build → resolve → search → reduce → cache pipeline on small
//! hand-built buildings and checks the occlusion values that come out.

use roomtone_core::{
    Aabb, Blocking, BuildError, CapacityKind, ConnectorDesc, ConnectorId, CostModel, GraphLimits,
    MAX_OCCLUSION, OcclusionParams, PathCache, PathSearch, SearchError, SearchParams, Vec3,
    ZoneDesc, ZoneGraph, ZoneId, ZoneIndex, reduce,
};

/// Three 4×3×4 rooms in a row, 10 units apart, centers at x = 2, 12, 22.
fn corridor(bc_open: bool, bc_amount: f32) -> ZoneGraph {
    let room = |id: u32, name: &str, x: f32| {
        ZoneDesc::new(
            id,
            name,
            Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 4.0, 3.0, 4.0)),
        )
    };
    let zones = [room(1, "A", 0.0), room(2, "B", 10.0), room(3, "C", 20.0)];
    let connectors = [
        ConnectorDesc::new(10, "A-B", 1, 2, Vec3::new(7.0, 1.0, 2.0)),
        ConnectorDesc::new(11, "B-C", 2, 3, Vec3::new(17.0, 1.0, 2.0))
            .with_open(bc_open)
            .with_blocking(Blocking {
                occlusion_amount: bc_amount,
                ..Blocking::default()
            }),
    ];
    ZoneGraph::build(&zones, &connectors, GraphLimits::default()).unwrap()
}

const EMITTER: Vec3 = Vec3::new(2.0, 1.0, 2.0);
const LISTENER: Vec3 = Vec3::new(22.0, 1.0, 2.0);

/// Resolve both ends, search, and reduce. `None` when unreachable.
fn occlusion_between(
    graph: &ZoneGraph,
    search: &mut PathSearch,
    emitter: Vec3,
    listener: Vec3,
    params: &OcclusionParams,
) -> Option<f32> {
    let from = graph.resolve(emitter);
    let to = graph.resolve(listener);
    let search_params = SearchParams {
        max_depth: params.max_depth,
        source_pos: emitter,
        listener_pos: listener,
        ..SearchParams::default()
    };
    search
        .find_path(graph, &CostModel::default(), from, to, &search_params)
        .unwrap()?;
    Some(reduce(
        graph,
        search.path(),
        search.edges(),
        to,
        listener,
        params,
    ))
}

fn names(graph: &ZoneGraph, path: &[ZoneIndex]) -> Vec<String> {
    path.iter()
        .map(|&z| graph.zone(z).unwrap().name().to_string())
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn open_corridor_is_unoccluded() {
    let graph = corridor(true, 50.0);
    let mut search = PathSearch::default();
    let occ = occlusion_between(
        &graph,
        &mut search,
        EMITTER,
        LISTENER,
        &OcclusionParams::default(),
    )
    .unwrap();
    assert_eq!(names(&graph, search.path()), ["A", "B", "C"]);
    assert!(occ.abs() < 1e-6, "got {occ}");
}

#[test]
fn closed_door_occludes_proportionally() {
    let graph = corridor(false, 50.0);
    let mut search = PathSearch::default();
    let occ = occlusion_between(
        &graph,
        &mut search,
        EMITTER,
        LISTENER,
        &OcclusionParams::default(),
    )
    .unwrap();

    // Listener is 5 units from the B-C door: 25 / 25 saturates the falloff,
    // so distance weight = 1 * 2 + 1 = 3. Second hop: depth weight 0.9.
    let expected = 50.0 * 3.0 * 0.9;
    assert!((occ - expected).abs() < 1e-3, "got {occ}, expected {expected}");
    assert!(occ > 0.0 && occ < MAX_OCCLUSION);
}

#[test]
fn portal_offset_skips_the_only_closed_door() {
    let graph = corridor(false, 50.0);
    let mut search = PathSearch::default();
    let params = OcclusionParams {
        portal_offset: 1,
        ..OcclusionParams::default()
    };
    let occ = occlusion_between(&graph, &mut search, EMITTER, LISTENER, &params).unwrap();
    assert!(occ.abs() < 1e-6, "got {occ}");
}

#[test]
fn zone_capacity_is_not_truncated() {
    let zones: Vec<ZoneDesc> = (0..3)
        .map(|i| {
            let x = i as f32 * 10.0;
            ZoneDesc::new(
                i,
                "room",
                Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 4.0, 3.0, 4.0)),
            )
        })
        .collect();
    let err = ZoneGraph::build(&zones, &[], GraphLimits::with_max_zones(2)).unwrap_err();
    assert!(matches!(
        err,
        BuildError::CapacityExceeded {
            kind: CapacityKind::Zones,
            ..
        }
    ));
}

#[test]
fn disconnected_listener_is_no_path() {
    let graph = corridor(true, 0.0);
    let mut search = PathSearch::default();
    let far_away = Vec3::new(500.0, 0.0, 0.0);
    assert_eq!(graph.resolve(far_away), graph.global_zone());
    assert!(
        occlusion_between(
            &graph,
            &mut search,
            EMITTER,
            far_away,
            &OcclusionParams::default()
        )
        .is_none()
    );
}

#[test]
fn connector_toggle_changes_occlusion() {
    let mut graph = corridor(true, 50.0);
    let mut search = PathSearch::default();
    let params = OcclusionParams::default();
    let open = occlusion_between(&graph, &mut search, EMITTER, LISTENER, &params).unwrap();

    assert!(graph.set_connector_open(ConnectorId(11), false).unwrap());
    let closed = occlusion_between(&graph, &mut search, EMITTER, LISTENER, &params).unwrap();
    assert!(closed > open);
}

#[test]
fn search_rejects_graph_larger_than_scratch() {
    let graph = corridor(true, 0.0);
    let mut search = PathSearch::new(2);
    let a = graph.index_of(ZoneId(1)).unwrap();
    let c = graph.index_of(ZoneId(3)).unwrap();
    let err = search
        .find_path(&graph, &CostModel::default(), a, c, &SearchParams::default())
        .unwrap_err();
    assert!(matches!(err, SearchError::CapacityExceeded { .. }));
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn cache_reuses_result_until_listener_moves() {
    let graph = corridor(false, 50.0);
    let mut search = PathSearch::default();
    let mut cache = PathCache::default();
    let params = OcclusionParams::default();
    let source = graph.resolve(EMITTER);

    let mut lookup = |listener: Vec3| {
        let listener_zone = graph.resolve(listener);
        let search_params = SearchParams {
            source_pos: EMITTER,
            listener_pos: listener,
            ..SearchParams::default()
        };
        let lookup = cache
            .get_or_compute(source, listener_zone, listener, false, |path| {
                let found = search.find_path(
                    &graph,
                    &CostModel::default(),
                    source,
                    listener_zone,
                    &search_params,
                )?;
                if found.is_none() {
                    return Ok::<_, SearchError>(None);
                }
                path.extend_from_slice(search.path());
                Ok(Some(reduce(
                    &graph,
                    search.path(),
                    search.edges(),
                    listener_zone,
                    listener,
                    &params,
                )))
            })
            .unwrap();
        (lookup.hit, lookup.entry.serial, lookup.entry.occlusion)
    };

    let (hit, first, occ) = lookup(LISTENER);
    assert!(!hit);
    assert!(occ.unwrap() > 0.0);

    let (hit, serial, again) = lookup(LISTENER + Vec3::new(0.2, 0.0, 0.2));
    assert!(hit);
    assert_eq!(serial, first);
    assert_eq!(again, occ);

    let (hit, serial, _) = lookup(LISTENER + Vec3::new(0.0, 0.0, 1.0));
    assert!(!hit);
    assert_ne!(serial, first);
}

// ============================================================================
// Layers
// ============================================================================

#[test]
fn stacked_floors_connect_through_stairwell_only() {
    let floor = |id: u32, name: &str, y: f32, layer: i32| {
        ZoneDesc::new(
            id,
            name,
            Aabb::new(Vec3::new(0.0, y, 0.0), Vec3::new(10.0, y + 3.0, 10.0)),
        )
        .with_layer(layer)
    };
    // Floors touch at y = 3 but sit on different layers, so they are not
    // overlap neighbors unless a connector joins them.
    let zones = [floor(1, "ground", 0.0, 0), floor(2, "upper", 3.0, 1)];
    let graph = ZoneGraph::build(&zones, &[], GraphLimits::default()).unwrap();
    let mut search = PathSearch::default();
    let below = Vec3::new(5.0, 1.0, 5.0);
    let above = Vec3::new(5.0, 4.5, 5.0);
    assert!(
        occlusion_between(&graph, &mut search, below, above, &OcclusionParams::default())
            .is_none()
    );

    let stairs = [ConnectorDesc::new(1, "stairs", 1, 2, Vec3::new(9.0, 3.0, 9.0))];
    let graph = ZoneGraph::build(&zones, &stairs, GraphLimits::default()).unwrap();
    assert!(
        occlusion_between(&graph, &mut search, below, above, &OcclusionParams::default())
            .is_some()
    );
    // Exactly on the shared face the higher layer wins.
    assert_eq!(graph.get_current_zone(Vec3::new(5.0, 3.0, 5.0)), ZoneId(2));
}
