//! One-off path search between two zones.

use clap::Args;
use roomtone_config::SceneConfig;
use roomtone_core::{
    ConnectorId, OcclusionParams, PathSearch, SearchParams, Vec3, ZoneGraph, ZoneIndex, reduce,
};

use super::common::{build_graph, load_scene, parse_vec3};

/// Find the path between two zones and reduce it to occlusion.
#[derive(Args)]
pub struct RouteArgs {
    /// Built-in scene name or path to a scene file
    pub scene: String,

    /// Source zone (name or id)
    pub from: String,

    /// Listener zone (name or id)
    pub to: String,

    /// Source position (x,y,z); defaults to the center of the source zone
    #[arg(long, value_parser = parse_vec3)]
    pub source: Option<Vec3>,

    /// Listener position (x,y,z); defaults to the center of the listener zone
    #[arg(long, value_parser = parse_vec3)]
    pub listener: Option<Vec3>,

    /// Closed connectors ignored before occlusion accumulates
    #[arg(long, default_value_t = 0)]
    pub portal_offset: usize,

    /// Hop limit (engine default when omitted)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Open these connector ids before searching
    #[arg(long, value_delimiter = ',')]
    pub open: Vec<u32>,

    /// Close these connector ids before searching
    #[arg(long, value_delimiter = ',')]
    pub close: Vec<u32>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the route command.
pub fn run(args: RouteArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.scene)?;
    let config = scene.engine_config();
    let mut graph = build_graph(&scene)?;

    for &id in &args.open {
        graph.set_connector_open(ConnectorId(id), true)?;
    }
    for &id in &args.close {
        graph.set_connector_open(ConnectorId(id), false)?;
    }

    let from = zone_index(&scene, &graph, &args.from)?;
    let to = zone_index(&scene, &graph, &args.to)?;
    let source_pos = args.source.unwrap_or_else(|| zone_center(&graph, from));
    let listener_pos = args.listener.unwrap_or_else(|| zone_center(&graph, to));

    let params = OcclusionParams {
        portal_offset: args.portal_offset,
        max_depth: args.max_depth.unwrap_or(config.default_max_depth),
        blockability: 1.0,
    };
    let search_params = SearchParams {
        max_depth: params.max_depth,
        max_cost: config.max_path_cost,
        source_pos,
        listener_pos,
    };

    let mut search = PathSearch::new(graph.zone_count());
    let Some(outcome) = search.find_path(&graph, &config.cost, from, to, &search_params)? else {
        if args.json {
            println!("{}", serde_json::json!({ "reachable": false }));
        } else {
            println!(
                "No path from {} to {} (unreachable occlusion {:.1})",
                name(&graph, from),
                name(&graph, to),
                config.unreachable_occlusion
            );
        }
        return Ok(());
    };

    let occlusion = reduce(
        &graph,
        search.path(),
        search.edges(),
        to,
        listener_pos,
        &params,
    );
    let zones: Vec<&str> = search.path().iter().map(|&z| name(&graph, z)).collect();
    let hops: Vec<String> = search
        .edges()
        .iter()
        .copied()
        .map(|edge| match edge.and_then(|c| graph.connector(c)) {
            Some(c) => format!(
                "{} ({})",
                c.name(),
                if c.is_open() { "open" } else { "closed" }
            ),
            None => "overlap".to_string(),
        })
        .collect();

    if args.json {
        let report = serde_json::json!({
            "reachable": true,
            "path": zones,
            "via": hops,
            "cost": outcome.cost,
            "hops": outcome.hops,
            "depth_limited": outcome.depth_overflow,
            "occlusion": occlusion,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Path:      {}", zones.join(" -> "));
    let via = if hops.is_empty() {
        "-".to_string()
    } else {
        hops.join(", ")
    };
    println!("Via:       {via}");
    println!("Cost:      {:.2} ({} hops)", outcome.cost, outcome.hops);
    if outcome.depth_overflow {
        println!("Note:      hop limit {} was reached during the search", params.max_depth);
    }
    println!("Occlusion: {occlusion:.1}");
    Ok(())
}

fn zone_index(scene: &SceneConfig, graph: &ZoneGraph, key: &str) -> anyhow::Result<ZoneIndex> {
    if let Some(zone) = graph.zone_by_name(key) {
        return Ok(zone.index());
    }
    match scene.find_zone(key) {
        Some(zone) => Ok(graph.index_of(roomtone_core::ZoneId(zone.id))?),
        None => anyhow::bail!("Zone '{}' not found in scene '{}'", key, scene.name),
    }
}

fn zone_center(graph: &ZoneGraph, index: ZoneIndex) -> Vec3 {
    graph
        .zone(index)
        .and_then(|z| z.bounds())
        .map_or(Vec3::ZERO, |b| b.center())
}

fn name(graph: &ZoneGraph, index: ZoneIndex) -> &str {
    graph.zone(index).map_or("?", |z| z.name())
}
