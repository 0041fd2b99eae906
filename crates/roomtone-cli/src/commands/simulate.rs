//! Scheduler-driven simulation of a scene.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use clap::Args;
use roomtone_config::LoadedScene;
use roomtone_core::ConnectorId;
use roomtone_engine::{RecordingSink, Scheduler, TickReport, ZoneEvent, ZoneSubject};
use serde::Serialize;

use super::common::{load_scene, parse_toggle};

/// Run the engine on a scene and print occlusion per tick.
#[derive(Args)]
pub struct SimulateArgs {
    /// Built-in scene name or path to a scene file
    pub scene: String,

    /// Number of ticks to run (0 with --realtime runs until Ctrl+C)
    #[arg(short = 'n', long, default_value_t = 10)]
    pub ticks: u64,

    /// Pace ticks on the wall clock instead of running them back to back
    #[arg(long)]
    pub realtime: bool,

    /// Flip a connector before a tick, as `connector@tick` (repeatable)
    #[arg(long = "toggle", value_parser = parse_toggle)]
    pub toggles: Vec<(u32, u64)>,

    /// Print one JSON object per tick
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TickRow<'a> {
    tick: u64,
    propagated: usize,
    cache_hits: u64,
    cache_misses: u64,
    elapsed_us: u128,
    overrun: bool,
    emitters: Vec<EmitterRow<'a>>,
    heard: Vec<HeardRow<'a>>,
    events: Vec<String>,
}

#[derive(Serialize)]
struct EmitterRow<'a> {
    name: &'a str,
    zone: Option<u32>,
    occlusion: Option<f32>,
}

#[derive(Serialize)]
struct HeardRow<'a> {
    listener: &'a str,
    emitter: &'a str,
    occlusion: f32,
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.scene)?;
    let mut loaded = scene.instantiate()?;
    let mut scheduler = Scheduler::from_config(loaded.world.config());
    let mut sink = RecordingSink::new();

    let running = Arc::new(AtomicBool::new(true));
    if args.realtime {
        let r = Arc::clone(&running);
        ctrlc::set_handler(move || {
            eprintln!("\nStopping...");
            r.store(false, Ordering::SeqCst);
        })?;
    } else if args.ticks == 0 {
        anyhow::bail!("--ticks 0 is only allowed with --realtime");
    }

    tracing::info!(
        scene = %scene.name,
        ticks = args.ticks,
        period_ms = scheduler.period().as_secs_f64() * 1000.0,
        realtime = args.realtime,
        "starting simulation"
    );

    if !args.json {
        let hz = 1.0 / scheduler.period().as_secs_f64();
        println!("Simulating '{}' at {hz:.0} Hz", scene.name);
        println!();
    }

    let start = Instant::now();
    let mut overruns = 0_u64;
    let mut toggled_at = None;
    while running.load(Ordering::SeqCst) && (args.ticks == 0 || scheduler.ticks() < args.ticks) {
        let tick = scheduler.ticks();
        if toggled_at != Some(tick) {
            for &(id, at) in &args.toggles {
                if at == tick {
                    toggle(&mut loaded, id, args.json)?;
                }
            }
            toggled_at = Some(tick);
        }

        let now = if args.realtime {
            let due = scheduler.next_due();
            let elapsed = start.elapsed();
            if due > elapsed {
                std::thread::sleep(due - elapsed);
            }
            start.elapsed()
        } else {
            scheduler.next_due()
        };

        let Some(report) = scheduler.poll(&mut loaded.world, &mut sink, now)? else {
            continue;
        };
        if report.overrun {
            overruns += 1;
        }
        let drained: Vec<ZoneEvent> = loaded.world.drain_zone_events().collect();
        let events = drained
            .into_iter()
            .map(|e| describe_event(&loaded, e))
            .collect();

        let row = tick_row(&loaded, &sink, &report, events);
        if args.json {
            println!("{}", serde_json::to_string(&row)?);
        } else {
            print_row(&row);
        }
    }

    if !args.json {
        println!();
        println!(
            "Ran {} ticks in {:.1} ms ({} overruns)",
            scheduler.ticks(),
            start.elapsed().as_secs_f64() * 1000.0,
            overruns
        );
        println!("Final occlusion:");
        for (name, id) in &loaded.emitters {
            match sink.occlusion(*id) {
                Some(occ) => println!("  {name:14} {occ:6.1}"),
                None => println!("  {name:14}      -"),
            }
        }
    }
    Ok(())
}

fn toggle(loaded: &mut LoadedScene, id: u32, quiet: bool) -> anyhow::Result<()> {
    let open = match loaded.world.graph() {
        Some(graph) => graph.connector_by_id(ConnectorId(id))?.is_open(),
        None => anyhow::bail!("scene has no graph"),
    };
    loaded.world.set_connector_open(ConnectorId(id), !open)?;
    if !quiet {
        println!(
            "  connector {id} {}",
            if open { "closed" } else { "opened" }
        );
    }
    Ok(())
}

fn tick_row<'a>(
    loaded: &'a LoadedScene,
    sink: &RecordingSink,
    report: &TickReport,
    events: Vec<String>,
) -> TickRow<'a> {
    let emitters = loaded
        .emitters
        .iter()
        .map(|(name, id)| EmitterRow {
            name,
            zone: loaded.world.emitter_zone(*id).ok().flatten().map(|z| z.0),
            occlusion: sink.occlusion(*id),
        })
        .collect();
    let heard = sink
        .heard_all()
        .filter_map(|(listener, emitter, occlusion)| {
            Some(HeardRow {
                listener: loaded.listener_name(listener)?,
                emitter: loaded.emitter_name(emitter)?,
                occlusion,
            })
        })
        .collect();

    TickRow {
        tick: report.tick,
        propagated: report.emitters_propagated,
        cache_hits: report.cache_hits,
        cache_misses: report.cache_misses,
        elapsed_us: report.elapsed.as_micros(),
        overrun: report.overrun,
        emitters,
        heard,
        events,
    }
}

fn print_row(row: &TickRow<'_>) {
    println!(
        "tick {:>4}  propagated {:>2}  hits {:>3}  misses {:>3}{}",
        row.tick,
        row.propagated,
        row.cache_hits,
        row.cache_misses,
        if row.overrun { "  OVERRUN" } else { "" }
    );
    for event in &row.events {
        println!("  {event}");
    }
    for e in &row.emitters {
        if let Some(occ) = e.occlusion {
            println!("  {:14} applied {occ:6.1}", e.name);
        }
    }
    for h in &row.heard {
        println!("  {:14} hears {:14} {:6.1}", h.listener, h.emitter, h.occlusion);
    }
}

fn describe_event(loaded: &LoadedScene, event: ZoneEvent) -> String {
    let who = match event.subject() {
        ZoneSubject::Emitter(id) => loaded.emitter_name(id).map(str::to_string),
        ZoneSubject::Listener(id) => loaded.listener_name(id).map(str::to_string),
    }
    .unwrap_or_else(|| event.subject().to_string());
    let zone = loaded
        .world
        .graph()
        .and_then(|g| g.zone_by_id(event.zone()).ok())
        .map_or_else(|| event.zone().0.to_string(), |z| z.name().to_string());
    match event {
        ZoneEvent::Exited { .. } => format!("{who} left {zone}"),
        ZoneEvent::Entered { .. } => format!("{who} entered {zone}"),
    }
}
