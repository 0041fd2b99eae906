//! Roomtone Engine - runtime side of zone-graph sound occlusion
//!
//! Wraps the pure algorithms of [`roomtone_core`] into an explicitly owned
//! [`PropagationWorld`] that tracks emitters and listeners, caches paths,
//! eases occlusion, and crossfades reverb as sounds move between zones.
//!
//! # Components
//!
//! - [`PropagationWorld`] - graph lifecycle, entity registry, per-tick propagation
//! - [`Scheduler`] - fixed-rate tick driver with overrun detection
//! - [`EmitterState`] - `Idle` / `Playing` state machine per emitter
//! - [`OcclusionFade`] / [`ReverbFade`] - per-tick interpolation state
//! - [`AudioSink`] - the boundary to whatever audio engine is in use
//! - [`ZoneEvent`] - queued zone transitions, drained by collaborators
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use roomtone_core::{Aabb, ConnectorDesc, EmitterDesc, ListenerDesc, Vec3, ZoneDesc};
//! use roomtone_engine::{PropagationWorld, RecordingSink, Scheduler};
//!
//! let room = |id, x: f32| {
//!     ZoneDesc::new(id, format!("room{id}"), Aabb::new(
//!         Vec3::new(x, 0.0, 0.0),
//!         Vec3::new(x + 4.0, 3.0, 4.0),
//!     ))
//! };
//!
//! let mut world = PropagationWorld::default();
//! world.rebuild(
//!     &[room(1, 0.0), room(2, 10.0)],
//!     &[ConnectorDesc::new(1, "door", 1, 2, Vec3::new(7.0, 1.0, 2.0)).with_open(false)],
//! )?;
//!
//! let radio = world.register_emitter(EmitterDesc::at(Vec3::new(2.0, 1.0, 2.0)));
//! world.register_listener(ListenerDesc::at(Vec3::new(12.0, 1.0, 2.0)));
//! world.play(radio)?;
//!
//! let mut sink = RecordingSink::new();
//! let mut scheduler = Scheduler::default();
//! let report = scheduler.poll(&mut world, &mut sink, Duration::ZERO)?.unwrap();
//! assert_eq!(report.emitters_propagated, 1);
//! assert!(sink.occlusion(radio).unwrap() > 0.0);
//! # Ok::<(), roomtone_engine::EngineError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod fade;
pub mod scheduler;
pub mod sink;
pub mod state;
pub mod world;

pub use config::{DEFAULT_TICK_HZ, EngineConfig};
pub use error::EngineError;
pub use events::{DEFAULT_EVENT_CAPACITY, ZoneEvent, ZoneEventQueue, ZoneSubject};
pub use fade::{OcclusionFade, ReverbFade};
pub use scheduler::{Scheduler, TickReport};
pub use sink::{AudioSink, NullSink, RecordingSink, ReverbMix};
pub use state::EmitterState;
pub use world::{PropagationWorld, TickStats};
