//! Scene validation.
//!
//! Catches authoring mistakes before the graph builder sees them, and reports
//! all of them at once. Some of what is flagged here (unknown connector
//! endpoints, for instance) the builder would tolerate by redirecting to the
//! global zone; in a scene file it is almost always a typo.
//!
//! # Example
//!
//! ```rust
//! use roomtone_config::{SceneConfig, ZoneConfig, validate_scene};
//!
//! let scene = SceneConfig::new("one room")
//!     .with_zone(ZoneConfig::boxed(1, "Room", [0.0; 3], [4.0, 3.0, 4.0]));
//! validate_scene(&scene).expect("a single bounded zone is valid");
//! ```

use std::collections::BTreeSet;
use thiserror::Error;

use crate::scene::SceneConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The scene has no zones.
    #[error("scene has no zones")]
    NoZones,

    /// Two zones share an id.
    #[error("duplicate zone id {0}")]
    DuplicateZone(u32),

    /// Two connectors share an id.
    #[error("duplicate connector id {0}")]
    DuplicateConnector(u32),

    /// More than one zone is flagged global.
    #[error("zones {first} and {second} are both flagged global")]
    MultipleGlobalZones {
        /// First global zone id.
        first: u32,
        /// Second global zone id.
        second: u32,
    },

    /// A non-global zone without both corners.
    #[error("zone {0} needs both `min` and `max`")]
    MissingBounds(u32),

    /// A zone whose corners are not finite.
    #[error("zone {0} has non-finite bounds")]
    InvalidBounds(u32),

    /// A connector or emitter references a zone id that does not exist.
    #[error("{owner} references unknown zone {zone}")]
    UnknownZone {
        /// What holds the reference, e.g. `connector 3`.
        owner: String,
        /// The missing zone id.
        zone: u32,
    },

    /// A position with NaN or infinite components.
    #[error("{0} has a non-finite position")]
    NonFinitePosition(String),

    /// Two emitters or two listeners share a name.
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName {
        /// `emitter` or `listener`.
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A numeric setting out of its valid range.
    #[error("'{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the setting.
        param: String,
        /// The offending value.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(errors: &mut Vec<ValidationError>, param: &str, value: f32, min: f32, max: f32) {
    if !(value.is_finite() && value >= min && value <= max) {
        errors.push(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        });
    }
}

fn finite(p: [f32; 3]) -> bool {
    p.iter().all(|c| c.is_finite())
}

/// Validate a scene, collecting every problem.
///
/// Returns the single error directly when there is exactly one, and
/// [`ValidationError::Multiple`] otherwise.
pub fn validate_scene(scene: &SceneConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    validate_engine(scene, &mut errors);

    if scene.zones.is_empty() {
        errors.push(ValidationError::NoZones);
    }

    let mut zone_ids = BTreeSet::new();
    let mut global: Option<u32> = None;
    for zone in &scene.zones {
        if !zone_ids.insert(zone.id) {
            errors.push(ValidationError::DuplicateZone(zone.id));
        }
        if zone.global {
            match global {
                Some(first) => errors.push(ValidationError::MultipleGlobalZones {
                    first,
                    second: zone.id,
                }),
                None => global = Some(zone.id),
            }
            continue;
        }
        match (zone.min, zone.max) {
            (Some(min), Some(max)) => {
                if !finite(min) || !finite(max) {
                    errors.push(ValidationError::InvalidBounds(zone.id));
                }
            }
            _ => errors.push(ValidationError::MissingBounds(zone.id)),
        }
    }

    let mut connector_ids = BTreeSet::new();
    for c in &scene.connectors {
        let owner = format!("connector {}", c.id);
        if !connector_ids.insert(c.id) {
            errors.push(ValidationError::DuplicateConnector(c.id));
        }
        for zone in [c.zone_a, c.zone_b].into_iter().flatten() {
            if !zone_ids.contains(&zone) {
                errors.push(ValidationError::UnknownZone {
                    owner: owner.clone(),
                    zone,
                });
            }
        }
        if !finite(c.position) {
            errors.push(ValidationError::NonFinitePosition(owner.clone()));
        }
        check_range(&mut errors, &format!("{owner}.occlusion_amount"), c.occlusion_amount, 0.0, 255.0);
        check_range(&mut errors, &format!("{owner}.aggression"), c.aggression, 0.0, f32::MAX);
        check_range(&mut errors, &format!("{owner}.influence"), c.influence, 0.0, f32::MAX);
        check_range(&mut errors, &format!("{owner}.weight"), c.weight, 0.0, f32::MAX);
    }

    let mut names = BTreeSet::new();
    for e in &scene.emitters {
        let owner = format!("emitter '{}'", e.name);
        if !names.insert(e.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                kind: "emitter",
                name: e.name.clone(),
            });
        }
        if !finite(e.position) {
            errors.push(ValidationError::NonFinitePosition(owner.clone()));
        }
        if let Some(zone) = e.zone
            && !zone_ids.contains(&zone)
        {
            errors.push(ValidationError::UnknownZone {
                owner: owner.clone(),
                zone,
            });
        }
        if e.max_depth == Some(0) {
            errors.push(ValidationError::OutOfRange {
                param: format!("{owner}.max_depth"),
                value: 0.0,
                min: 1.0,
                max: f32::MAX,
            });
        }
        check_range(&mut errors, &format!("{owner}.blockability"), e.blockability, 0.0, f32::MAX);
        if let Some(range) = e.range_max {
            check_range(&mut errors, &format!("{owner}.range_max"), range, 0.0, f32::MAX);
        }
    }

    let mut names = BTreeSet::new();
    for l in &scene.listeners {
        if !names.insert(l.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                kind: "listener",
                name: l.name.clone(),
            });
        }
        if !finite(l.position) {
            errors.push(ValidationError::NonFinitePosition(format!("listener '{}'", l.name)));
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

fn validate_engine(scene: &SceneConfig, errors: &mut Vec<ValidationError>) {
    let e = &scene.engine;
    check_range(errors, "engine.tick_hz", e.tick_hz, 0.1, 1000.0);
    check_range(errors, "engine.max_path_cost", e.max_path_cost, 0.0, f32::MAX);
    check_range(errors, "engine.repath_distance_sq", e.repath_distance_sq, 0.0, f32::MAX);
    check_range(errors, "engine.primary_occlusion_scale", e.primary_occlusion_scale, 0.0, 1.0);
    check_range(errors, "engine.occlusion_fade_secs", e.occlusion_fade_secs, 0.0, 60.0);
    check_range(errors, "engine.reverb_fade_secs", e.reverb_fade_secs, 0.0, 60.0);
    check_range(errors, "engine.unreachable_occlusion", e.unreachable_occlusion, 0.0, 255.0);
    if e.zone_capacity < 1 {
        errors.push(ValidationError::OutOfRange {
            param: "engine.zone_capacity".to_string(),
            value: 0.0,
            min: 1.0,
            max: f32::MAX,
        });
    }
    if e.default_max_depth < 1 {
        errors.push(ValidationError::OutOfRange {
            param: "engine.default_max_depth".to_string(),
            value: 0.0,
            min: 1.0,
            max: f32::MAX,
        });
    }

    let c = &e.cost;
    check_range(errors, "engine.cost.min_cost", c.min_cost, 0.0, f32::MAX);
    check_range(errors, "engine.cost.max_cost", c.max_cost, c.min_cost.max(0.0), f32::MAX);
    check_range(errors, "engine.cost.long_range", c.long_range, f32::MIN_POSITIVE, f32::MAX);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ConnectorConfig, EmitterConfig, ListenerConfig, ZoneConfig};

    fn two_rooms() -> SceneConfig {
        SceneConfig::new("two rooms")
            .with_zone(ZoneConfig::boxed(1, "A", [0.0; 3], [4.0; 3]))
            .with_zone(ZoneConfig::boxed(2, "B", [4.0, 0.0, 0.0], [8.0, 4.0, 4.0]))
            .with_connector(ConnectorConfig::between(1, "door", 1, 2, [4.0, 1.0, 2.0]))
    }

    #[test]
    fn valid_scene_passes() {
        assert_eq!(validate_scene(&two_rooms()), Ok(()));
    }

    #[test]
    fn empty_scene_is_rejected() {
        assert_eq!(
            validate_scene(&SceneConfig::new("void")),
            Err(ValidationError::NoZones)
        );
    }

    #[test]
    fn single_problem_is_not_wrapped() {
        let scene = two_rooms().with_connector(ConnectorConfig::between(
            2,
            "ghost door",
            1,
            9,
            [0.0; 3],
        ));
        assert_eq!(
            validate_scene(&scene),
            Err(ValidationError::UnknownZone {
                owner: "connector 2".to_string(),
                zone: 9
            })
        );
    }

    #[test]
    fn every_problem_is_reported() {
        let mut scene = two_rooms()
            .with_zone(ZoneConfig::boxed(1, "A again", [0.0; 3], [1.0; 3]))
            .with_emitter(EmitterConfig::at("tv", [1.0; 3]))
            .with_emitter(EmitterConfig::at("tv", [2.0; 3]))
            .with_listener(ListenerConfig::at("ear", [f32::NAN, 0.0, 0.0]));
        scene.engine.tick_hz = 0.0;

        let Err(ValidationError::Multiple(errors)) = validate_scene(&scene) else {
            panic!("expected multiple errors");
        };
        assert!(errors.contains(&ValidationError::DuplicateZone(1)));
        assert!(errors.contains(&ValidationError::DuplicateName {
            kind: "emitter",
            name: "tv".to_string()
        }));
        assert!(errors.contains(&ValidationError::NonFinitePosition(
            "listener 'ear'".to_string()
        )));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::OutOfRange { param, .. } if param == "engine.tick_hz"))
        );
    }

    #[test]
    fn global_zone_rules() {
        let mut outside = ZoneConfig::boxed(10, "Outside", [0.0; 3], [0.0; 3]);
        outside.global = true;
        outside.min = None;
        outside.max = None;
        let mut second = outside.clone();
        second.id = 11;

        assert_eq!(validate_scene(&two_rooms().with_zone(outside.clone())), Ok(()));
        assert_eq!(
            validate_scene(&two_rooms().with_zone(outside).with_zone(second)),
            Err(ValidationError::MultipleGlobalZones {
                first: 10,
                second: 11
            })
        );
    }

    #[test]
    fn bounded_zones_need_corners() {
        let mut zone = ZoneConfig::boxed(3, "C", [0.0; 3], [1.0; 3]);
        zone.max = None;
        assert_eq!(
            validate_scene(&two_rooms().with_zone(zone)),
            Err(ValidationError::MissingBounds(3))
        );
    }

    #[test]
    fn multiple_display_joins_messages() {
        let err = ValidationError::Multiple(vec![
            ValidationError::NoZones,
            ValidationError::DuplicateConnector(4),
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: scene has no zones; duplicate connector id 4"
        );
    }
}
