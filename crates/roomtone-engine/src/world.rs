//! The propagation world: one explicitly owned context holding the zone
//! graph, the search scratch space, and every registered emitter and
//! listener.
//!
//! # Tick
//!
//! [`PropagationWorld::tick`] runs one pass:
//!
//! 1. Resolve every listener and emitter to a zone (the position snapshot
//!    for the tick), queuing zone events and starting reverb crossfades.
//! 2. Step each emitter's state machine and propagate the ones that need it.
//! 3. Advance occlusion and reverb fades and hand the values to the sink.
//!
//! All emitters in a tick see the same graph epoch and listener snapshot.
//! Graph rebuilds take `&mut self`, so they cannot overlap a tick.

use std::collections::BTreeMap;
use std::time::Duration;

use roomtone_core::{
    ConnectorDesc, ConnectorId, EmitterDesc, EmitterId, ListenerDesc, ListenerId, PathCache,
    PathSearch, PropagationSettings, SearchParams, Vec3, ZoneDesc, ZoneGraph, ZoneId, ZoneIndex,
    reduce,
};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{ZoneEvent, ZoneEventQueue, ZoneSubject};
use crate::fade::{OcclusionFade, ReverbFade};
use crate::sink::{AudioSink, ReverbMix};
use crate::state::EmitterState;

/// Counters of one [`PropagationWorld::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Emitters that ran a propagation pass.
    pub propagated: usize,
    /// Listener paths answered from cache.
    pub cache_hits: u64,
    /// Listener paths searched.
    pub cache_misses: u64,
}

#[derive(Debug, Clone)]
struct EmitterSlot {
    desc: EmitterDesc,
    state: EmitterState,
    zone: Option<ZoneId>,
    cache: PathCache,
    fade: OcclusionFade,
    reverb: ReverbFade,
    force_next: bool,
}

#[derive(Debug, Clone)]
struct ListenerSlot {
    desc: ListenerDesc,
    zone: Option<ZoneIndex>,
}

/// One emitter-to-listener query.
struct Hearing {
    source_zone: ZoneIndex,
    listener_zone: ZoneIndex,
    listener_pos: Vec3,
    force: bool,
}

/// Explicitly owned propagation context.
#[derive(Debug, Clone)]
pub struct PropagationWorld {
    config: EngineConfig,
    graph: Option<ZoneGraph>,
    epoch: u64,
    search: PathSearch,
    emitters: BTreeMap<EmitterId, EmitterSlot>,
    listeners: BTreeMap<ListenerId, ListenerSlot>,
    primary: Option<ListenerId>,
    events: ZoneEventQueue,
    next_emitter: u32,
    next_listener: u32,
    tick_ids: Vec<EmitterId>,
}

impl Default for PropagationWorld {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PropagationWorld {
    /// Creates an empty world. Nothing propagates until [`rebuild`](Self::rebuild)
    /// succeeds.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            search: PathSearch::new(config.zone_capacity),
            config,
            graph: None,
            epoch: 0,
            emitters: BTreeMap::new(),
            listeners: BTreeMap::new(),
            primary: None,
            events: ZoneEventQueue::new(),
            next_emitter: 0,
            next_listener: 0,
            tick_ids: Vec::new(),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current graph, if one has been built.
    pub fn graph(&self) -> Option<&ZoneGraph> {
        self.graph.as_ref()
    }

    /// Number of successful builds so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // --- Graph ---

    /// Replaces the zone graph.
    ///
    /// On failure the previous graph stays active and nothing else changes.
    /// On success every cached path is dropped and every entity is resolved
    /// again against the new graph.
    pub fn rebuild(
        &mut self,
        zones: &[ZoneDesc],
        connectors: &[ConnectorDesc],
    ) -> Result<(), EngineError> {
        let graph = match ZoneGraph::build(zones, connectors, self.config.graph_limits()) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!(error = %e, "zone graph rebuild rejected, keeping epoch {}", self.epoch);
                return Err(e.into());
            }
        };

        self.epoch += 1;
        tracing::info!(
            epoch = self.epoch,
            zones = graph.zone_count(),
            connectors = graph.connector_count(),
            global_synthesized = graph.global_synthesized(),
            "zone graph built"
        );
        self.graph = Some(graph);

        for slot in self.emitters.values_mut() {
            slot.cache.invalidate_all();
        }
        for slot in self.listeners.values_mut() {
            slot.zone = None;
        }
        self.refresh_zones();
        Ok(())
    }

    /// Opens or closes a connector. Returns whether its state changed; a
    /// change drops every cached path.
    pub fn set_connector_open(&mut self, id: ConnectorId, open: bool) -> Result<bool, EngineError> {
        let graph = self.graph.as_mut().ok_or(EngineError::NoGraph)?;
        let changed = graph.set_connector_open(id, open)?;
        if changed {
            for slot in self.emitters.values_mut() {
                slot.cache.invalidate_all();
            }
        }
        Ok(changed)
    }

    /// Stable id of the zone owning `position`.
    pub fn get_current_zone(&self, position: Vec3) -> Result<ZoneId, EngineError> {
        let graph = self.graph.as_ref().ok_or(EngineError::NoGraph)?;
        Ok(graph.get_current_zone(position))
    }

    // --- Emitters ---

    /// Registers an emitter. It stays idle until [`play`](Self::play).
    pub fn register_emitter(&mut self, desc: EmitterDesc) -> EmitterId {
        let id = EmitterId(self.next_emitter);
        self.next_emitter += 1;
        self.emitters.insert(
            id,
            EmitterSlot {
                desc,
                state: EmitterState::Idle,
                zone: None,
                cache: PathCache::new(self.config.repath_distance_sq),
                fade: OcclusionFade::new(0.0, self.config.occlusion_fade_secs),
                reverb: ReverbFade::new(self.config.reverb_fade_secs),
                force_next: false,
            },
        );
        tracing::debug!(emitter = %id, "emitter registered");
        id
    }

    /// Removes an emitter, queuing an exit from its last zone.
    pub fn unregister_emitter(&mut self, id: EmitterId) -> Result<EmitterDesc, EngineError> {
        let slot = self
            .emitters
            .remove(&id)
            .ok_or(EngineError::UnknownEmitter(id))?;
        if let Some(zone) = slot.zone {
            self.events.record_exit(ZoneSubject::Emitter(id), zone);
        }
        Ok(slot.desc)
    }

    /// Starts (or restarts) an emitter. The next tick propagates it without
    /// consulting the cache and applies the result without easing.
    pub fn play(&mut self, id: EmitterId) -> Result<(), EngineError> {
        let slot = self.emitter_slot_mut(id)?;
        slot.state = EmitterState::Playing { propagated: false };
        slot.force_next = true;
        slot.fade.arm_snap();
        Ok(())
    }

    /// Stops an emitter.
    pub fn stop(&mut self, id: EmitterId) -> Result<(), EngineError> {
        self.emitter_slot_mut(id)?.state = EmitterState::Idle;
        Ok(())
    }

    /// Moves an emitter.
    pub fn set_emitter_position(&mut self, id: EmitterId, position: Vec3) -> Result<(), EngineError> {
        self.emitter_slot_mut(id)?.desc.position = position;
        Ok(())
    }

    /// Replaces an emitter's propagation settings.
    pub fn set_emitter_settings(
        &mut self,
        id: EmitterId,
        settings: PropagationSettings,
    ) -> Result<(), EngineError> {
        self.emitter_slot_mut(id)?.desc.settings = settings;
        Ok(())
    }

    /// An emitter's descriptor.
    pub fn emitter(&self, id: EmitterId) -> Result<&EmitterDesc, EngineError> {
        self.emitters
            .get(&id)
            .map(|s| &s.desc)
            .ok_or(EngineError::UnknownEmitter(id))
    }

    /// An emitter's playback state.
    pub fn emitter_state(&self, id: EmitterId) -> Result<EmitterState, EngineError> {
        self.emitters
            .get(&id)
            .map(|s| s.state)
            .ok_or(EngineError::UnknownEmitter(id))
    }

    /// An emitter's currently applied (eased) occlusion.
    pub fn emitter_occlusion(&self, id: EmitterId) -> Result<f32, EngineError> {
        self.emitters
            .get(&id)
            .map(|s| s.fade.value())
            .ok_or(EngineError::UnknownEmitter(id))
    }

    /// Zone an emitter was last resolved to.
    pub fn emitter_zone(&self, id: EmitterId) -> Result<Option<ZoneId>, EngineError> {
        self.emitters
            .get(&id)
            .map(|s| s.zone)
            .ok_or(EngineError::UnknownEmitter(id))
    }

    /// Registered emitters in id order.
    pub fn emitter_ids(&self) -> impl Iterator<Item = EmitterId> + '_ {
        self.emitters.keys().copied()
    }

    fn emitter_slot_mut(&mut self, id: EmitterId) -> Result<&mut EmitterSlot, EngineError> {
        self.emitters
            .get_mut(&id)
            .ok_or(EngineError::UnknownEmitter(id))
    }

    // --- Listeners ---

    /// Registers a listener. The first listener becomes primary.
    pub fn register_listener(&mut self, desc: ListenerDesc) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, ListenerSlot { desc, zone: None });
        if self.primary.is_none() {
            self.primary = Some(id);
        }
        tracing::debug!(listener = %id, "listener registered");
        id
    }

    /// Removes a listener, queuing an exit from its last zone. Removing the
    /// primary listener leaves the world without one.
    pub fn unregister_listener(&mut self, id: ListenerId) -> Result<ListenerDesc, EngineError> {
        let slot = self
            .listeners
            .remove(&id)
            .ok_or(EngineError::UnknownListener(id))?;
        if let Some(zone) = slot.desc.last_zone {
            self.events.record_exit(ZoneSubject::Listener(id), zone);
        }
        if self.primary == Some(id) {
            self.primary = None;
        }
        Ok(slot.desc)
    }

    /// Chooses the listener whose occlusion drives emitters' own occlusion.
    pub fn set_primary_listener(&mut self, id: Option<ListenerId>) -> Result<(), EngineError> {
        if let Some(id) = id {
            if !self.listeners.contains_key(&id) {
                return Err(EngineError::UnknownListener(id));
            }
        }
        self.primary = id;
        Ok(())
    }

    /// The primary listener, if any.
    pub fn primary_listener(&self) -> Option<ListenerId> {
        self.primary
    }

    /// Moves a listener.
    pub fn set_listener_position(&mut self, id: ListenerId, position: Vec3) -> Result<(), EngineError> {
        let slot = self
            .listeners
            .get_mut(&id)
            .ok_or(EngineError::UnknownListener(id))?;
        slot.desc.position = position;
        Ok(())
    }

    /// A listener's descriptor, including its last known zone.
    pub fn listener(&self, id: ListenerId) -> Result<&ListenerDesc, EngineError> {
        self.listeners
            .get(&id)
            .map(|s| &s.desc)
            .ok_or(EngineError::UnknownListener(id))
    }

    /// Registered listeners in id order.
    pub fn listener_ids(&self) -> impl Iterator<Item = ListenerId> + '_ {
        self.listeners.keys().copied()
    }

    // --- Events ---

    /// Removes and yields pending zone events, oldest first.
    ///
    /// Hosts that tick the world should drain every tick; the queue holds
    /// [`DEFAULT_EVENT_CAPACITY`](crate::DEFAULT_EVENT_CAPACITY) events and
    /// drops the oldest beyond that.
    pub fn drain_zone_events(&mut self) -> impl Iterator<Item = ZoneEvent> + '_ {
        self.events.drain()
    }

    // --- Propagation ---

    /// Resolves every listener and emitter, queuing zone events for those
    /// that moved and starting reverb crossfades for emitters.
    pub fn refresh_zones(&mut self) {
        let Some(graph) = self.graph.as_ref() else {
            return;
        };

        for (&id, slot) in &mut self.listeners {
            let index = graph.resolve(slot.desc.position);
            let zone = graph.zones()[index.get()].id();
            self.events
                .record(ZoneSubject::Listener(id), slot.desc.last_zone, zone);
            slot.desc.last_zone = Some(zone);
            slot.zone = Some(index);
        }

        for (&id, slot) in &mut self.emitters {
            let index = source_zone(graph, &slot.desc);
            let zone = &graph.zones()[index.get()];
            if slot.zone == Some(zone.id()) {
                continue;
            }
            self.events
                .record(ZoneSubject::Emitter(id), slot.zone, zone.id());
            if slot.zone.is_none() {
                slot.reverb.set_immediate(zone.reverb());
            } else if slot.reverb.change_to(zone.reverb()) {
                tracing::debug!(
                    emitter = %id,
                    from = ?slot.reverb.from(),
                    to = ?slot.reverb.to(),
                    "reverb crossfade"
                );
            }
            slot.zone = Some(zone.id());
        }
    }

    /// Computes an emitter's occlusion towards every listener in range and
    /// towards the primary listener.
    ///
    /// Each in-range listener receives [`AudioSink::on_hear`]. The primary
    /// listener's occlusion, scaled by `primary_occlusion_scale`, becomes
    /// the emitter's new occlusion target and is returned. Without a primary
    /// listener the target is left unchanged and returned as is.
    /// Unreachable listeners get `unreachable_occlusion`.
    pub fn propagate(
        &mut self,
        id: EmitterId,
        sink: &mut dyn AudioSink,
    ) -> Result<f32, EngineError> {
        let graph = self.graph.as_ref().ok_or(EngineError::NoGraph)?;
        let slot = self
            .emitters
            .get_mut(&id)
            .ok_or(EngineError::UnknownEmitter(id))?;
        let desc = slot.desc;
        let source = source_zone(graph, &desc);
        let force = std::mem::take(&mut slot.force_next);

        let mut primary_target = None;
        for (&lid, listener) in &self.listeners {
            let is_primary = self.primary == Some(lid);
            let in_range = desc.in_range(listener.desc.position);
            if !is_primary && !in_range {
                continue;
            }

            let occlusion = if desc.settings.global {
                0.0
            } else {
                let hearing = Hearing {
                    source_zone: source,
                    listener_zone: listener
                        .zone
                        .unwrap_or_else(|| graph.resolve(listener.desc.position)),
                    listener_pos: listener.desc.position,
                    force,
                };
                occlusion_to(
                    graph,
                    &mut self.search,
                    &self.config,
                    &mut slot.cache,
                    &desc,
                    &hearing,
                )?
            };

            if in_range {
                sink.on_hear(lid, id, occlusion);
            }
            if is_primary {
                primary_target = Some(occlusion * self.config.primary_occlusion_scale);
            }
        }

        if let Some(target) = primary_target {
            slot.fade.set_target(target);
        }
        Ok(slot.fade.target())
    }

    /// Runs one propagation pass and advances fades by `dt`.
    ///
    /// Zone changes found by the pass are queued for
    /// [`drain_zone_events`](Self::drain_zone_events); an undrained queue
    /// keeps only the newest events.
    pub fn tick(&mut self, dt: Duration, sink: &mut dyn AudioSink) -> Result<TickStats, EngineError> {
        if self.graph.is_none() {
            return Err(EngineError::NoGraph);
        }
        self.refresh_zones();

        let mut stats = TickStats::default();
        let mut ids = std::mem::take(&mut self.tick_ids);
        ids.clear();
        ids.extend(self.emitters.keys().copied());

        for &id in &ids {
            let Some(slot) = self.emitters.get_mut(&id) else {
                continue;
            };
            let settings = slot.desc.settings;
            slot.state.begin_tick(&settings);
            if !slot.state.wants_propagation(&settings) {
                continue;
            }
            if let Err(e) = self.propagate(id, sink) {
                self.tick_ids = ids;
                return Err(e);
            }
            if let Some(slot) = self.emitters.get_mut(&id) {
                slot.state.mark_propagated();
            }
            stats.propagated += 1;
        }
        self.tick_ids = ids;

        for (&id, slot) in &mut self.emitters {
            let cache = slot.cache.take_stats();
            stats.cache_hits += cache.hits;
            stats.cache_misses += cache.misses;

            if !slot.state.is_playing() {
                continue;
            }
            sink.set_occlusion(id, slot.fade.advance(dt));
            if slot.reverb.is_active() {
                let mix = slot.reverb.advance(dt);
                sink.set_reverb(
                    id,
                    ReverbMix {
                        from: slot.reverb.from(),
                        to: slot.reverb.to(),
                        mix,
                    },
                );
            }
        }

        Ok(stats)
    }
}

/// Zone an emitter sounds from: its override when that zone exists,
/// otherwise wherever its position resolves.
fn source_zone(graph: &ZoneGraph, desc: &EmitterDesc) -> ZoneIndex {
    if let Some(id) = desc.settings.zone_override {
        match graph.index_of(id) {
            Ok(index) => return index,
            Err(_) => tracing::debug!(zone = %id, "zone override not in graph, resolving by position"),
        }
    }
    graph.resolve(desc.position)
}

/// Cached search + reduction for one listener.
fn occlusion_to(
    graph: &ZoneGraph,
    search: &mut PathSearch,
    config: &EngineConfig,
    cache: &mut PathCache,
    emitter: &EmitterDesc,
    hearing: &Hearing,
) -> Result<f32, EngineError> {
    let params = emitter.occlusion_params(config.default_max_depth);
    let search_params = SearchParams {
        max_depth: params.max_depth,
        max_cost: config.max_path_cost,
        source_pos: emitter.position,
        listener_pos: hearing.listener_pos,
    };
    let (source, target) = (hearing.source_zone, hearing.listener_zone);

    let lookup = cache.get_or_compute(
        source,
        target,
        hearing.listener_pos,
        hearing.force,
        |path| {
            let Some(outcome) =
                search.find_path(graph, &config.cost, source, target, &search_params)?
            else {
                tracing::debug!(from = %source, to = %target, "listener unreachable");
                return Ok::<_, EngineError>(None);
            };
            if outcome.depth_overflow {
                tracing::debug!(from = %source, to = %target, "depth limit reached during search");
            }
            path.extend_from_slice(search.path());
            Ok(Some(reduce(
                graph,
                search.path(),
                search.edges(),
                target,
                hearing.listener_pos,
                &params,
            )))
        },
    )?;

    if !lookup.hit {
        tracing::trace!(from = %source, to = %target, occlusion = ?lookup.entry.occlusion, "path cache miss");
    }
    Ok(lookup
        .entry
        .occlusion
        .unwrap_or(config.unreachable_occlusion))
}
