//! Scene structure dump.

use clap::Args;
use roomtone_core::{Vec3, ZoneGraph, ZoneIndex};

use super::common::{build_graph, fmt_vec3, load_scene};

/// Show the built graph of a scene.
#[derive(Args)]
pub struct InspectArgs {
    /// Built-in scene name or path to a scene file
    pub scene: String,
}

/// Run the inspect command.
pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.scene)?;
    let graph = build_graph(&scene)?;

    println!("Scene: {}", scene.name);
    if let Some(desc) = &scene.description {
        println!("  {desc}");
    }
    println!();

    println!("Zones ({}):", graph.zone_count());
    for zone in graph.zones() {
        let extent = match zone.bounds() {
            Some(b) => format!("[{}] .. [{}]", fmt_vec3(b.min), fmt_vec3(b.max)),
            None => "unbounded".to_string(),
        };
        let mut tags = Vec::new();
        if zone.is_global() {
            tags.push("global".to_string());
            if graph.global_synthesized() {
                tags.push("synthesized".to_string());
            }
        } else {
            tags.push(format!("layer {}", zone.layer()));
        }
        if let Some(reverb) = zone.reverb() {
            tags.push(format!("reverb {reverb}"));
        }
        println!(
            "  {:>10}  {:12} {}  ({})",
            zone.id().0,
            zone.name(),
            extent,
            tags.join(", ")
        );
    }
    println!();

    println!("Connectors ({}):", graph.connector_count());
    for c in graph.connectors() {
        let [a, b] = c.zones();
        let state = if c.is_open() { "open" } else { "closed" };
        println!(
            "  {:>4}  {:16} {} <-> {}  {:6}  amount {:.1}  at [{}]",
            c.id().0,
            c.name(),
            zone_name(&graph, a),
            zone_name(&graph, b),
            state,
            c.blocking().occlusion_amount,
            fmt_vec3(c.position())
        );
    }
    println!();

    println!("Adjacency:");
    for zone in graph.zones() {
        let neighbors: Vec<&str> = graph
            .neighbors_of(zone.index())
            .iter()
            .map(|&n| zone_name(&graph, n))
            .collect();
        let list = if neighbors.is_empty() {
            "-".to_string()
        } else {
            neighbors.join(", ")
        };
        println!("  {:12} {}", zone.name(), list);
    }

    if !scene.emitters.is_empty() || !scene.listeners.is_empty() {
        println!();
        println!("Placement:");
        for e in &scene.emitters {
            let at = Vec3::from(e.position);
            println!("  emitter  {:14} {}", e.name, zone_name(&graph, graph.resolve(at)));
        }
        for l in &scene.listeners {
            let at = Vec3::from(l.position);
            let primary = if l.primary { " (primary)" } else { "" };
            println!(
                "  listener {:14} {}{}",
                l.name,
                zone_name(&graph, graph.resolve(at)),
                primary
            );
        }
    }

    Ok(())
}

fn zone_name(graph: &ZoneGraph, index: ZoneIndex) -> &str {
    graph.zone(index).map_or("?", |z| z.name())
}
