//! Scene file validation.

use std::path::PathBuf;

use clap::Args;
use roomtone_config::{SceneConfig, ValidationError, validate_scene};

use super::common::build_graph;

/// Check a scene file for authoring mistakes.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the scene file
    pub file: PathBuf,
}

/// Run the validate command.
pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let scene = SceneConfig::load(&args.file)?;

    if let Err(err) = validate_scene(&scene) {
        let errors = match err {
            ValidationError::Multiple(errors) => errors,
            single => vec![single],
        };
        println!("{}: {} problem(s)", args.file.display(), errors.len());
        for e in &errors {
            println!("  - {e}");
        }
        anyhow::bail!("scene '{}' is invalid", scene.name);
    }

    let graph = build_graph(&scene)?;
    println!(
        "{}: OK ({} zones, {} connectors, {} emitters, {} listeners)",
        args.file.display(),
        graph.zone_count(),
        graph.connector_count(),
        scene.emitters.len(),
        scene.listeners.len()
    );
    if graph.global_synthesized() {
        println!("  note: no global zone authored; one was synthesized");
    }
    Ok(())
}
