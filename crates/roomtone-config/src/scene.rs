//! Scene file format and conversion into engine types.

use serde::{Deserialize, Serialize};
use std::path::Path;

use roomtone_core::{
    Aabb, Blocking, ConnectorDesc, ConnectorId, CostModel, EmitterDesc, EmitterId, ListenerDesc,
    ListenerId, PropagationSettings, Vec3, ZoneDesc, ZoneId,
};
use roomtone_engine::{EngineConfig, PropagationWorld};

use crate::error::ConfigError;
use crate::validation::validate_scene;

/// A building plus the sounds and ears inside it.
///
/// # TOML Format
///
/// ```toml
/// name = "Two Rooms"
///
/// [engine]
/// tick_hz = 20.0
///
/// [[zones]]
/// id = 1
/// name = "Kitchen"
/// min = [0.0, 0.0, 0.0]
/// max = [4.0, 3.0, 4.0]
/// reverb = "tile"
///
/// [[zones]]
/// id = 2
/// name = "Hall"
/// min = [4.0, 0.0, 0.0]
/// max = [10.0, 3.0, 4.0]
///
/// [[connectors]]
/// id = 1
/// name = "Kitchen door"
/// zone_a = 1
/// zone_b = 2
/// position = [4.0, 1.0, 2.0]
/// open = false
/// occlusion_amount = 40.0
///
/// [[emitters]]
/// name = "radio"
/// position = [1.0, 1.0, 1.0]
/// looping = true
///
/// [[listeners]]
/// name = "player"
/// position = [8.0, 1.7, 2.0]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneConfig {
    /// Name of the scene.
    pub name: String,

    /// Optional description of the scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Engine tunables; every field is optional.
    #[serde(default)]
    pub engine: EngineSection,

    /// Zones of the building.
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,

    /// Openings between zones.
    #[serde(default)]
    pub connectors: Vec<ConnectorConfig>,

    /// Sound sources.
    #[serde(default)]
    pub emitters: Vec<EmitterConfig>,

    /// Listeners.
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,
}

/// `[engine]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSection {
    /// Propagation passes per second.
    pub tick_hz: f32,
    /// Maximum zones, including the global zone.
    pub zone_capacity: usize,
    /// Maximum enabled connectors.
    pub connector_capacity: usize,
    /// Paths costing more than this are unreachable.
    pub max_path_cost: f32,
    /// Hop limit for emitters without their own.
    pub default_max_depth: usize,
    /// Listener displacement (squared) tolerated by path caches.
    pub repath_distance_sq: f32,
    /// Scale applied to primary-listener occlusion.
    pub primary_occlusion_scale: f32,
    /// Occlusion ease duration in seconds.
    pub occlusion_fade_secs: f32,
    /// Reverb crossfade duration in seconds.
    pub reverb_fade_secs: f32,
    /// Occlusion reported for unreachable listeners.
    pub unreachable_occlusion: f32,
    /// `[engine.cost]` table.
    pub cost: CostSection,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for EngineSection {
    fn from(c: &EngineConfig) -> Self {
        Self {
            tick_hz: c.tick_hz,
            zone_capacity: c.zone_capacity,
            connector_capacity: c.connector_capacity,
            max_path_cost: c.max_path_cost,
            default_max_depth: c.default_max_depth,
            repath_distance_sq: c.repath_distance_sq,
            primary_occlusion_scale: c.primary_occlusion_scale,
            occlusion_fade_secs: c.occlusion_fade_secs,
            reverb_fade_secs: c.reverb_fade_secs,
            unreachable_occlusion: c.unreachable_occlusion,
            cost: CostSection::from(&c.cost),
        }
    }
}

impl From<&EngineSection> for EngineConfig {
    fn from(s: &EngineSection) -> Self {
        Self {
            tick_hz: s.tick_hz,
            zone_capacity: s.zone_capacity,
            connector_capacity: s.connector_capacity,
            max_path_cost: s.max_path_cost,
            default_max_depth: s.default_max_depth,
            repath_distance_sq: s.repath_distance_sq,
            primary_occlusion_scale: s.primary_occlusion_scale,
            occlusion_fade_secs: s.occlusion_fade_secs,
            reverb_fade_secs: s.reverb_fade_secs,
            unreachable_occlusion: s.unreachable_occlusion,
            cost: CostModel::from(&s.cost),
        }
    }
}

/// `[engine.cost]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[allow(missing_docs)]
pub struct CostSection {
    pub open_cost: f32,
    pub closed_cost: f32,
    pub distance_weight: f32,
    pub frequency_weight: f32,
    pub closed_frequency_factor: f32,
    pub long_range: f32,
    pub source_blend: f32,
    pub listener_blend: f32,
    pub min_cost: f32,
    pub max_cost: f32,
}

impl Default for CostSection {
    fn default() -> Self {
        Self::from(&CostModel::default())
    }
}

impl From<&CostModel> for CostSection {
    fn from(m: &CostModel) -> Self {
        Self {
            open_cost: m.open_cost,
            closed_cost: m.closed_cost,
            distance_weight: m.distance_weight,
            frequency_weight: m.frequency_weight,
            closed_frequency_factor: m.closed_frequency_factor,
            long_range: m.long_range,
            source_blend: m.source_blend,
            listener_blend: m.listener_blend,
            min_cost: m.min_cost,
            max_cost: m.max_cost,
        }
    }
}

impl From<&CostSection> for CostModel {
    fn from(s: &CostSection) -> Self {
        Self {
            open_cost: s.open_cost,
            closed_cost: s.closed_cost,
            distance_weight: s.distance_weight,
            frequency_weight: s.frequency_weight,
            closed_frequency_factor: s.closed_frequency_factor,
            long_range: s.long_range,
            source_blend: s.source_blend,
            listener_blend: s.listener_blend,
            min_cost: s.min_cost,
            max_cost: s.max_cost,
        }
    }
}

/// `[[zones]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneConfig {
    /// Stable zone id, referenced by connectors.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Universal fallback zone. Needs no bounds.
    #[serde(default, skip_serializing_if = "is_false")]
    pub global: bool,
    /// Minimum corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<[f32; 3]>,
    /// Maximum corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<[f32; 3]>,
    /// Priority when bounds overlap.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub layer: i32,
    /// Reverb preset selected inside the zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverb: Option<String>,
}

impl ZoneConfig {
    /// Creates a box-shaped zone.
    pub fn boxed(id: u32, name: impl Into<String>, min: [f32; 3], max: [f32; 3]) -> Self {
        Self {
            id,
            name: name.into(),
            global: false,
            min: Some(min),
            max: Some(max),
            layer: 0,
            reverb: None,
        }
    }

    /// Bounding box, when both corners are given.
    pub fn bounds(&self) -> Option<Aabb> {
        Some(Aabb::new(Vec3::from(self.min?), Vec3::from(self.max?)))
    }

    /// Builder-side descriptor.
    pub fn to_desc(&self) -> ZoneDesc {
        let mut desc = if self.global {
            ZoneDesc::global(self.id, self.name.clone())
        } else {
            ZoneDesc {
                id: ZoneId(self.id),
                name: self.name.clone(),
                layer: self.layer,
                bounds: self.bounds(),
                is_global: false,
                reverb: None,
            }
        };
        desc.reverb.clone_from(&self.reverb);
        desc
    }
}

/// `[[connectors]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorConfig {
    /// Stable connector id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// First endpoint; omitted means the global zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_a: Option<u32>,
    /// Second endpoint; omitted means the global zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_b: Option<u32>,
    /// Position of the opening.
    pub position: [f32; 3],
    /// Initial openness.
    #[serde(default = "default_true")]
    pub open: bool,
    /// Disabled connectors are left out of the graph.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Static traversal weight.
    #[serde(default, skip_serializing_if = "is_zero_f32")]
    pub weight: f32,
    /// Occlusion contributed when closed.
    #[serde(default = "default_occlusion_amount")]
    pub occlusion_amount: f32,
    /// Squared-distance scale of the listener falloff.
    #[serde(default = "default_aggression")]
    pub aggression: f32,
    /// Extra weight once the listener is far from the opening.
    #[serde(default = "default_influence")]
    pub influence: f32,
}

impl ConnectorConfig {
    /// An open connector between two zones with default blocking.
    pub fn between(id: u32, name: impl Into<String>, a: u32, b: u32, position: [f32; 3]) -> Self {
        let blocking = Blocking::default();
        Self {
            id,
            name: name.into(),
            zone_a: Some(a),
            zone_b: Some(b),
            position,
            open: true,
            enabled: true,
            weight: 0.0,
            occlusion_amount: blocking.occlusion_amount,
            aggression: blocking.aggression,
            influence: blocking.influence,
        }
    }

    /// Builder-side descriptor.
    pub fn to_desc(&self) -> ConnectorDesc {
        ConnectorDesc {
            id: ConnectorId(self.id),
            name: self.name.clone(),
            zone_a: self.zone_a.map(ZoneId),
            zone_b: self.zone_b.map(ZoneId),
            position: Vec3::from(self.position),
            open: self.open,
            weight: self.weight,
            blocking: Blocking {
                occlusion_amount: self.occlusion_amount,
                aggression: self.aggression,
                influence: self.influence,
            },
            enabled: self.enabled,
        }
    }
}

/// `[[emitters]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmitterConfig {
    /// Name used by tooling and reports.
    pub name: String,
    /// World position.
    pub position: [f32; 3],
    /// Start playing as soon as the scene is instantiated.
    #[serde(default = "default_true")]
    pub autoplay: bool,
    /// Propagation switch.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Heard everywhere without occlusion.
    #[serde(default, skip_serializing_if = "is_false")]
    pub global: bool,
    /// Propagate every tick.
    #[serde(default, skip_serializing_if = "is_false")]
    pub repropagate: bool,
    /// Looping sound; propagates every tick.
    #[serde(default, skip_serializing_if = "is_false")]
    pub looping: bool,
    /// Hop limit; engine default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Closed connectors ignored before occlusion accumulates.
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub portal_offset: usize,
    /// Pins the emitter to a zone id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<u32>,
    /// Multiplier on connector contributions.
    #[serde(default = "default_blockability")]
    pub blockability: f32,
    /// Listeners farther than this are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_max: Option<f32>,
}

impl EmitterConfig {
    /// A one-shot emitter at `position`.
    pub fn at(name: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            position,
            autoplay: true,
            enabled: true,
            global: false,
            repropagate: false,
            looping: false,
            max_depth: None,
            portal_offset: 0,
            zone: None,
            blockability: 1.0,
            range_max: None,
        }
    }

    /// Engine-side descriptor.
    pub fn to_desc(&self) -> EmitterDesc {
        EmitterDesc {
            position: Vec3::from(self.position),
            settings: PropagationSettings {
                enabled: self.enabled,
                global: self.global,
                repropagate: self.repropagate,
                looping: self.looping,
                max_depth: self.max_depth,
                portal_offset: self.portal_offset,
                zone_override: self.zone.map(ZoneId),
            },
            blockability: self.blockability,
            range_max: self.range_max,
        }
    }
}

/// `[[listeners]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenerConfig {
    /// Name used by tooling and reports.
    pub name: String,
    /// World position.
    pub position: [f32; 3],
    /// Drives emitters' own occlusion. The first listener is primary when
    /// none is flagged.
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary: bool,
}

impl ListenerConfig {
    /// A listener at `position`.
    pub fn at(name: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            position,
            primary: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_blockability() -> f32 {
    1.0
}

fn default_occlusion_amount() -> f32 {
    Blocking::default().occlusion_amount
}

fn default_aggression() -> f32 {
    Blocking::default().aggression
}

fn default_influence() -> f32 {
    Blocking::default().influence
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &i32) -> bool {
    *v == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero_usize(v: &usize) -> bool {
    *v == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

/// A scene turned into a running world.
#[derive(Debug)]
pub struct LoadedScene {
    /// Scene name.
    pub name: String,
    /// The world, with its graph built and emitters registered.
    pub world: PropagationWorld,
    /// Emitter names in file order.
    pub emitters: Vec<(String, EmitterId)>,
    /// Listener names in file order.
    pub listeners: Vec<(String, ListenerId)>,
}

impl LoadedScene {
    /// Emitter handle by name.
    pub fn emitter(&self, name: &str) -> Option<EmitterId> {
        self.emitters
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, id)| id)
    }

    /// Listener handle by name.
    pub fn listener(&self, name: &str) -> Option<ListenerId> {
        self.listeners
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, id)| id)
    }

    /// Name of an emitter handle.
    pub fn emitter_name(&self, id: EmitterId) -> Option<&str> {
        self.emitters
            .iter()
            .find(|&&(_, e)| e == id)
            .map(|(n, _)| n.as_str())
    }

    /// Name of a listener handle.
    pub fn listener_name(&self, id: ListenerId) -> Option<&str> {
        self.listeners
            .iter()
            .find(|&&(_, l)| l == id)
            .map(|(n, _)| n.as_str())
    }
}

impl SceneConfig {
    /// Create a new empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            engine: EngineSection::default(),
            zones: Vec::new(),
            connectors: Vec::new(),
            emitters: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a zone.
    pub fn with_zone(mut self, zone: ZoneConfig) -> Self {
        self.zones.push(zone);
        self
    }

    /// Add a connector.
    pub fn with_connector(mut self, connector: ConnectorConfig) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Add an emitter.
    pub fn with_emitter(mut self, emitter: EmitterConfig) -> Self {
        self.emitters.push(emitter);
        self
    }

    /// Add a listener.
    pub fn with_listener(mut self, listener: ListenerConfig) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Load a scene from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a scene from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the scene to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the scene to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Engine configuration from the `[engine]` table.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::from(&self.engine)
    }

    /// Zone descriptors in file order.
    pub fn zone_descs(&self) -> Vec<ZoneDesc> {
        self.zones.iter().map(ZoneConfig::to_desc).collect()
    }

    /// Connector descriptors in file order.
    pub fn connector_descs(&self) -> Vec<ConnectorDesc> {
        self.connectors.iter().map(ConnectorConfig::to_desc).collect()
    }

    /// Zone config by display name (case-insensitive) or numeric id.
    pub fn find_zone(&self, key: &str) -> Option<&ZoneConfig> {
        let by_id = key.parse::<u32>().ok();
        self.zones
            .iter()
            .find(|z| Some(z.id) == by_id || z.name.eq_ignore_ascii_case(key))
    }

    /// Validates the scene and builds a world from it.
    ///
    /// Listeners are registered first; the first one flagged `primary` (or
    /// the first listener) becomes primary. Emitters with `autoplay` are
    /// started.
    pub fn instantiate(&self) -> Result<LoadedScene, ConfigError> {
        validate_scene(self)?;

        let mut world = PropagationWorld::new(self.engine_config());
        world.rebuild(&self.zone_descs(), &self.connector_descs())?;

        let mut listeners = Vec::with_capacity(self.listeners.len());
        let mut primary = None;
        for l in &self.listeners {
            let id = world.register_listener(ListenerDesc::at(Vec3::from(l.position)));
            if l.primary && primary.is_none() {
                primary = Some(id);
            }
            listeners.push((l.name.clone(), id));
        }
        if primary.is_some() {
            world.set_primary_listener(primary)?;
        }

        let mut emitters = Vec::with_capacity(self.emitters.len());
        for e in &self.emitters {
            let id = world.register_emitter(e.to_desc());
            if e.autoplay {
                world.play(id)?;
            }
            emitters.push((e.name.clone(), id));
        }

        Ok(LoadedScene {
            name: self.name.clone(),
            world,
            emitters,
            listeners,
        })
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Resolves a scene argument: an existing file path is loaded, anything else
/// is looked up among the built-in scenes.
pub fn find_scene(name_or_path: &str) -> Result<SceneConfig, ConfigError> {
    let path = Path::new(name_or_path);
    if path.is_file() {
        return SceneConfig::load(path);
    }
    crate::factory_scenes::get_factory_scene(name_or_path)
        .ok_or_else(|| ConfigError::SceneNotFound(name_or_path.to_string()))
}
