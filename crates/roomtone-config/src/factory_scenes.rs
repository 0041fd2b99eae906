//! Built-in scenes.
//!
//! Small buildings that are always available without scene files. They are
//! used by the CLI, the tests, and as starting points for new scenes.
//! Rooms are separated by 0.2-unit walls so that only connectors (and
//! deliberate overlaps such as the tower stairwell) join them.

use crate::SceneConfig;

/// Built-in scene identifiers.
pub static FACTORY_SCENE_NAMES: &[&str] = &["corridor", "apartment", "tower"];

static FACTORY_SCENES_TOML: &[(&str, &str)] = &[
    ("corridor", CORRIDOR_SCENE),
    ("apartment", APARTMENT_SCENE),
    ("tower", TOWER_SCENE),
];

/// Three rooms in a row; the far door is closed.
const CORRIDOR_SCENE: &str = r#"
name = "Corridor"
description = "Rooms A, B and C in a row. The B-C door is closed."

[[zones]]
id = 1
name = "A"
min = [0.0, 0.0, 0.0]
max = [4.0, 3.0, 4.0]
reverb = "small_room"

[[zones]]
id = 2
name = "B"
min = [10.0, 0.0, 0.0]
max = [14.0, 3.0, 4.0]
reverb = "corridor"

[[zones]]
id = 3
name = "C"
min = [20.0, 0.0, 0.0]
max = [24.0, 3.0, 4.0]
reverb = "small_room"

[[connectors]]
id = 10
name = "A-B"
zone_a = 1
zone_b = 2
position = [7.0, 1.0, 2.0]

[[connectors]]
id = 11
name = "B-C"
zone_a = 2
zone_b = 3
position = [17.0, 1.0, 2.0]
open = false
occlusion_amount = 50.0

[[emitters]]
name = "radio"
position = [2.0, 1.0, 2.0]
looping = true

[[listeners]]
name = "player"
position = [22.0, 1.0, 2.0]
"#;

/// Five rooms around a hallway, with an authored outdoor zone.
const APARTMENT_SCENE: &str = r#"
name = "Apartment"
description = "Hallway, kitchen, living room, bedroom and bathroom. Two listeners."

[[zones]]
id = 0
name = "Street"
global = true
reverb = "outdoor"

[[zones]]
id = 1
name = "Hall"
min = [0.0, 0.0, 0.0]
max = [12.0, 3.0, 3.0]
reverb = "hallway"

[[zones]]
id = 2
name = "Kitchen"
min = [0.0, 0.0, 3.2]
max = [4.9, 3.0, 8.0]
reverb = "tile"

[[zones]]
id = 3
name = "Living"
min = [5.1, 0.0, 3.2]
max = [12.0, 3.0, 10.0]
reverb = "living_room"

[[zones]]
id = 4
name = "Bedroom"
min = [12.2, 0.0, 0.0]
max = [17.0, 3.0, 10.0]
reverb = "bedroom"

[[zones]]
id = 5
name = "Bathroom"
min = [0.0, 0.0, 8.2]
max = [4.9, 3.0, 10.0]
reverb = "bathroom"

[[connectors]]
id = 1
name = "Kitchen arch"
zone_a = 1
zone_b = 2
position = [2.5, 1.0, 3.1]

[[connectors]]
id = 2
name = "Living door"
zone_a = 1
zone_b = 3
position = [8.0, 1.0, 3.1]

[[connectors]]
id = 3
name = "Bedroom door"
zone_a = 1
zone_b = 4
position = [12.1, 1.0, 1.5]
open = false
occlusion_amount = 60.0

[[connectors]]
id = 4
name = "Bathroom door"
zone_a = 2
zone_b = 5
position = [2.5, 1.0, 8.1]
open = false
occlusion_amount = 40.0
aggression = 16.0

[[connectors]]
id = 5
name = "Serving hatch"
zone_a = 2
zone_b = 3
position = [5.0, 1.2, 5.5]
weight = 1.0

[[connectors]]
id = 6
name = "Front door"
zone_a = 1
position = [0.0, 1.0, 1.5]
open = false
occlusion_amount = 80.0

[[emitters]]
name = "tv"
position = [9.0, 1.0, 7.0]
looping = true

[[emitters]]
name = "shower"
position = [2.0, 1.0, 9.0]
looping = true
blockability = 1.2

[[emitters]]
name = "kettle"
position = [1.0, 1.0, 4.0]

[[listeners]]
name = "player"
position = [15.0, 1.7, 5.0]
primary = true

[[listeners]]
name = "guest"
position = [3.0, 1.7, 6.0]
"#;

/// Two floors bridged by a stairwell on a higher layer.
const TOWER_SCENE: &str = r#"
name = "Tower"
description = "Two stacked floors joined by a stairwell. The studio door is closed."

[engine]
default_max_depth = 8

[[zones]]
id = 1
name = "Lobby"
min = [0.0, 0.0, 0.0]
max = [10.0, 3.0, 10.0]
reverb = "lobby"

[[zones]]
id = 2
name = "Office"
min = [10.2, 0.0, 0.0]
max = [20.0, 3.0, 10.0]
reverb = "office"

[[zones]]
id = 3
name = "Landing"
min = [0.0, 3.0, 0.0]
max = [10.0, 6.0, 10.0]
layer = 1
reverb = "landing"

[[zones]]
id = 4
name = "Studio"
min = [10.2, 3.0, 0.0]
max = [20.0, 6.0, 10.0]
layer = 1
reverb = "studio"

[[zones]]
id = 5
name = "Stairwell"
min = [8.0, 0.0, 8.0]
max = [10.0, 6.0, 10.0]
layer = 2
reverb = "stairwell"

[[connectors]]
id = 1
name = "Office door"
zone_a = 1
zone_b = 2
position = [10.1, 1.0, 5.0]

[[connectors]]
id = 2
name = "Stairs bottom"
zone_a = 1
zone_b = 5
position = [9.0, 1.0, 9.0]

[[connectors]]
id = 3
name = "Stairs top"
zone_a = 5
zone_b = 3
position = [9.0, 4.0, 9.0]

[[connectors]]
id = 4
name = "Studio door"
zone_a = 3
zone_b = 4
position = [10.1, 4.0, 5.0]
open = false
occlusion_amount = 70.0

[[emitters]]
name = "drums"
position = [15.0, 4.5, 5.0]
looping = true

[[emitters]]
name = "lobby_music"
position = [2.0, 1.0, 2.0]
looping = true

[[listeners]]
name = "visitor"
position = [15.0, 1.7, 5.0]
"#;

/// All built-in scenes, in declaration order.
pub fn factory_scenes() -> Vec<SceneConfig> {
    FACTORY_SCENES_TOML
        .iter()
        .filter_map(|(_, toml)| SceneConfig::from_toml(toml).ok())
        .collect()
}

/// A built-in scene by identifier or display name, case-insensitive.
///
/// ```rust
/// use roomtone_config::get_factory_scene;
///
/// let tower = get_factory_scene("Tower").expect("tower is built in");
/// assert_eq!(tower.zones.len(), 5);
/// assert!(get_factory_scene("castle").is_none());
/// ```
pub fn get_factory_scene(name: &str) -> Option<SceneConfig> {
    if let Some((_, toml)) = FACTORY_SCENES_TOML
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(name))
    {
        return SceneConfig::from_toml(toml).ok();
    }
    factory_scenes()
        .into_iter()
        .find(|scene| scene.name.eq_ignore_ascii_case(name))
}

/// Identifiers of the built-in scenes.
pub fn factory_scene_names() -> Vec<&'static str> {
    FACTORY_SCENES_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` names a built-in scene.
pub fn is_factory_scene(name: &str) -> bool {
    get_factory_scene(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_scene;

    #[test]
    fn every_scene_parses_and_validates() {
        for (id, toml) in FACTORY_SCENES_TOML {
            let scene = SceneConfig::from_toml(toml)
                .unwrap_or_else(|e| panic!("scene '{id}' should parse: {e}"));
            assert!(scene.description.is_some(), "scene '{id}' needs a description");
            assert_eq!(validate_scene(&scene), Ok(()), "scene '{id}'");
        }
        assert_eq!(factory_scenes().len(), FACTORY_SCENE_NAMES.len());
    }

    #[test]
    fn names_match_table() {
        assert_eq!(factory_scene_names(), FACTORY_SCENE_NAMES);
        assert!(is_factory_scene("APARTMENT"));
        assert!(!is_factory_scene("basement"));
    }

    #[test]
    fn apartment_has_authored_global() {
        let scene = get_factory_scene("apartment").unwrap();
        let globals: Vec<_> = scene.zones.iter().filter(|z| z.global).collect();
        assert_eq!(globals.len(), 1);
        assert_eq!(scene.listeners.len(), 2);
        assert!(scene.connectors.iter().any(|c| c.zone_b.is_none()));
    }

    #[test]
    fn tower_overrides_engine_depth() {
        let scene = get_factory_scene("tower").unwrap();
        assert_eq!(scene.engine_config().default_max_depth, 8);
        assert!(scene.zones.iter().any(|z| z.layer == 2));
    }
}
