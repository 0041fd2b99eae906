//! Criterion benchmarks for graph build, path search, and occlusion reduction.
//!
//! Graphs are square grids of rooms joined by doors, every third door
//! closed. Three axes:
//!
//! - **Build** - `ZoneGraph::build` including overlap neighbor detection
//! - **Search** - corner-to-corner `find_path` on a warmed-up search
//! - **Reduce** - folding the found path into occlusion
//!
//! Run with: `cargo bench -p roomtone-core`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use roomtone_core::{
    Aabb, ConnectorDesc, CostModel, GraphLimits, OcclusionParams, PathSearch, SearchParams, Vec3,
    ZoneDesc, ZoneGraph, ZoneIndex, reduce,
};

const GRID_SIDES: &[u32] = &[4, 8, 16, 31];
const ROOM: f32 = 4.0;
const PITCH: f32 = 5.0;

fn grid(side: u32) -> (Vec<ZoneDesc>, Vec<ConnectorDesc>) {
    let id = |x: u32, z: u32| z * side + x;
    let mut zones = Vec::new();
    let mut doors = Vec::new();
    for z in 0..side {
        for x in 0..side {
            let min = Vec3::new(x as f32 * PITCH, 0.0, z as f32 * PITCH);
            zones.push(ZoneDesc::new(
                id(x, z),
                "cell",
                Aabb::new(min, min + Vec3::new(ROOM, 3.0, ROOM)),
            ));
            let mut push = |a: u32, b: u32, at: Vec3| {
                let n = doors.len() as u32;
                doors.push(ConnectorDesc::new(n, "door", a, b, at).with_open(n % 3 != 0));
            };
            if x + 1 < side {
                push(id(x, z), id(x + 1, z), min + Vec3::new(ROOM + 0.5, 1.0, ROOM * 0.5));
            }
            if z + 1 < side {
                push(id(x, z), id(x, z + 1), min + Vec3::new(ROOM * 0.5, 1.0, ROOM + 0.5));
            }
        }
    }
    (zones, doors)
}

fn corner_params(side: u32) -> SearchParams {
    let far = (side - 1) as f32 * PITCH + 2.0;
    SearchParams {
        max_depth: (2 * side) as usize,
        max_cost: f32::MAX,
        source_pos: Vec3::new(2.0, 1.0, 2.0),
        listener_pos: Vec3::new(far, 1.0, far),
    }
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &side in GRID_SIDES {
        let (zones, doors) = grid(side);
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &side, |b, _| {
            b.iter(|| {
                black_box(ZoneGraph::build(
                    black_box(&zones),
                    black_box(&doors),
                    GraphLimits::default(),
                ))
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let model = CostModel::default();
    for &side in GRID_SIDES {
        let (zones, doors) = grid(side);
        let graph = ZoneGraph::build(&zones, &doors, GraphLimits::default()).unwrap();
        let params = corner_params(side);
        let from = ZoneIndex::from_raw(0);
        let to = ZoneIndex::from_raw(side * side - 1);
        let mut search = PathSearch::default();

        group.bench_with_input(
            BenchmarkId::new("corner_to_corner", side * side),
            &side,
            |b, _| {
                b.iter(|| black_box(search.find_path(&graph, &model, from, to, &params)));
            },
        );
    }
    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    for &side in GRID_SIDES {
        let (zones, doors) = grid(side);
        let graph = ZoneGraph::build(&zones, &doors, GraphLimits::default()).unwrap();
        let params = corner_params(side);
        let to = ZoneIndex::from_raw(side * side - 1);
        let mut search = PathSearch::default();
        search
            .find_path(
                &graph,
                &CostModel::default(),
                ZoneIndex::from_raw(0),
                to,
                &params,
            )
            .unwrap();
        let occlusion = OcclusionParams {
            max_depth: params.max_depth,
            ..OcclusionParams::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(side * side), &side, |b, _| {
            b.iter(|| {
                black_box(reduce(
                    &graph,
                    search.path(),
                    search.edges(),
                    to,
                    params.listener_pos,
                    &occlusion,
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_search, bench_reduce);
criterion_main!(benches);
