//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use roomtone_config::{ConfigError, SceneConfig, find_scene};
use roomtone_core::{Vec3, ZoneGraph};

/// Load a scene by built-in name or file path.
pub fn load_scene(name: &str) -> anyhow::Result<SceneConfig> {
    match find_scene(name) {
        Ok(scene) => Ok(scene),
        Err(ConfigError::SceneNotFound(_)) => anyhow::bail!(
            "Scene '{}' not found. Use 'roomtone scenes' to see built-in scenes.",
            name
        ),
        Err(e) => Err(e).with_context(|| format!("loading scene '{name}'")),
    }
}

/// Build the zone graph of a scene with its configured limits.
pub fn build_graph(scene: &SceneConfig) -> anyhow::Result<ZoneGraph> {
    let graph = ZoneGraph::build(
        &scene.zone_descs(),
        &scene.connector_descs(),
        scene.engine_config().graph_limits(),
    )
    .with_context(|| format!("building zone graph for '{}'", scene.name))?;
    Ok(graph)
}

/// Parse an `x,y,z` position for clap's `value_parser`.
pub fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("Invalid position: '{s}' (expected x,y,z)"));
    }
    let mut xyz = [0.0_f32; 3];
    for (slot, part) in xyz.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("Invalid coordinate '{part}' in '{s}'"))?;
    }
    Ok(Vec3::from(xyz))
}

/// Parse a `connector@tick` toggle for clap's `value_parser`.
pub fn parse_toggle(s: &str) -> Result<(u32, u64), String> {
    let (id, tick) = s
        .split_once('@')
        .ok_or_else(|| format!("Invalid toggle: '{s}' (expected connector@tick)"))?;
    let id = id
        .trim()
        .parse()
        .map_err(|_| format!("Invalid connector id '{id}'"))?;
    let tick = tick
        .trim()
        .parse()
        .map_err(|_| format!("Invalid tick '{tick}'"))?;
    Ok((id, tick))
}

/// `1.0, 2.0, 3.0` with one decimal.
pub fn fmt_vec3(v: Vec3) -> String {
    format!("{:.1}, {:.1}, {:.1}", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positions() {
        assert_eq!(parse_vec3("1, 2.5,-3"), Ok(Vec3::new(1.0, 2.5, -3.0)));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,two,3").is_err());
    }

    #[test]
    fn parses_toggles() {
        assert_eq!(parse_toggle("11@5"), Ok((11, 5)));
        assert!(parse_toggle("11").is_err());
        assert!(parse_toggle("door@5").is_err());
    }
}
