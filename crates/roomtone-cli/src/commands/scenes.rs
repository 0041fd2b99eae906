//! Built-in scene listing.

use clap::Args;
use roomtone_config::{factory_scene_names, factory_scenes, get_factory_scene};

/// List built-in scenes.
#[derive(Args)]
pub struct ScenesArgs {
    /// Print this scene as TOML instead of listing
    pub name: Option<String>,
}

/// Run the scenes command.
pub fn run(args: ScenesArgs) -> anyhow::Result<()> {
    if let Some(name) = args.name {
        let Some(scene) = get_factory_scene(&name) else {
            anyhow::bail!(
                "No built-in scene '{}'. Available: {}",
                name,
                factory_scene_names().join(", ")
            );
        };
        print!("{}", scene.to_toml()?);
        return Ok(());
    }

    println!("Built-in Scenes:");
    println!("================");
    for (id, scene) in factory_scene_names().into_iter().zip(factory_scenes()) {
        println!(
            "  {:12} {:>2} zones {:>2} connectors {:>2} emitters  {}",
            id,
            scene.zones.len(),
            scene.connectors.len(),
            scene.emitters.len(),
            scene.description.as_deref().unwrap_or("")
        );
    }
    println!();
    println!("Run one with: roomtone simulate <scene> --ticks 20");
    Ok(())
}
