//! Scene files and engine configuration for roomtone.
//!
//! A *scene* is one TOML file describing a building (zones and connectors),
//! the sounds in it, the listeners, and optionally an `[engine]` table that
//! overrides [`EngineConfig`](roomtone_engine::EngineConfig) defaults.
//!
//! # Features
//!
//! - **Scene files**: load and save [`SceneConfig`] as TOML
//! - **Validation**: [`validate_scene`] reports every authoring mistake at once
//! - **Instantiation**: [`SceneConfig::instantiate`] builds a ready-to-tick world
//! - **Factory scenes**: `corridor`, `apartment`, and `tower` are always available
//!
//! # Example
//!
//! ```rust
//! use roomtone_config::get_factory_scene;
//! use roomtone_engine::{RecordingSink, Scheduler};
//!
//! let scene = get_factory_scene("corridor").unwrap();
//! let mut loaded = scene.instantiate().unwrap();
//!
//! let mut sink = RecordingSink::new();
//! let mut scheduler = Scheduler::from_config(loaded.world.config());
//! scheduler
//!     .poll(&mut loaded.world, &mut sink, scheduler.next_due())
//!     .unwrap();
//!
//! let radio = loaded.emitter("radio").unwrap();
//! assert!(sink.occlusion(radio).unwrap() > 0.0);
//! ```

mod error;
mod scene;

/// Scene validation.
pub mod validation;

/// Built-in scenes.
pub mod factory_scenes;

pub use error::ConfigError;
pub use factory_scenes::{
    FACTORY_SCENE_NAMES, factory_scene_names, factory_scenes, get_factory_scene, is_factory_scene,
};
pub use scene::{
    ConnectorConfig, CostSection, EmitterConfig, EngineSection, ListenerConfig, LoadedScene,
    SceneConfig, ZoneConfig, find_scene,
};
pub use validation::{ValidationError, ValidationResult, validate_scene};
