//! Boundary to the audio engine.
//!
//! The world never plays sound. It hands occlusion values and reverb mixes to
//! an [`AudioSink`], which forwards them to whatever engine is in use.

use std::collections::BTreeMap;

use roomtone_core::{EmitterId, ListenerId};

/// Reverb crossfade state delivered to the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbMix<'a> {
    /// Preset fading out.
    pub from: Option<&'a str>,
    /// Preset fading in.
    pub to: Option<&'a str>,
    /// Weight of `to` in `[0, 1]`.
    pub mix: f32,
}

/// Receiver of propagation results.
pub trait AudioSink {
    /// Applied (eased) occlusion of an emitter, towards the primary listener.
    fn set_occlusion(&mut self, emitter: EmitterId, occlusion: f32);

    /// Occlusion at which `listener` hears `emitter` this tick.
    fn on_hear(&mut self, listener: ListenerId, emitter: EmitterId, occlusion: f32);

    /// Reverb crossfade progress for an emitter.
    fn set_reverb(&mut self, emitter: EmitterId, reverb: ReverbMix<'_>) {
        let _ = (emitter, reverb);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn set_occlusion(&mut self, _emitter: EmitterId, _occlusion: f32) {}

    fn on_hear(&mut self, _listener: ListenerId, _emitter: EmitterId, _occlusion: f32) {}
}

/// Sink that remembers the latest value of everything it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    occlusion: BTreeMap<EmitterId, f32>,
    heard: BTreeMap<(ListenerId, EmitterId), f32>,
    reverb: BTreeMap<EmitterId, (Option<String>, Option<String>, f32)>,
    hear_calls: usize,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied occlusion of `emitter`.
    pub fn occlusion(&self, emitter: EmitterId) -> Option<f32> {
        self.occlusion.get(&emitter).copied()
    }

    /// Last occlusion at which `listener` heard `emitter`.
    pub fn heard(&self, listener: ListenerId, emitter: EmitterId) -> Option<f32> {
        self.heard.get(&(listener, emitter)).copied()
    }

    /// Every `(listener, emitter, occlusion)` heard so far, latest value only.
    pub fn heard_all(&self) -> impl Iterator<Item = (ListenerId, EmitterId, f32)> + '_ {
        self.heard.iter().map(|(&(l, e), &o)| (l, e, o))
    }

    /// Last reverb state of `emitter` as `(from, to, mix)`.
    pub fn reverb(&self, emitter: EmitterId) -> Option<(Option<&str>, Option<&str>, f32)> {
        self.reverb
            .get(&emitter)
            .map(|(from, to, mix)| (from.as_deref(), to.as_deref(), *mix))
    }

    /// Total number of `on_hear` calls received.
    pub fn hear_calls(&self) -> usize {
        self.hear_calls
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl AudioSink for RecordingSink {
    fn set_occlusion(&mut self, emitter: EmitterId, occlusion: f32) {
        self.occlusion.insert(emitter, occlusion);
    }

    fn on_hear(&mut self, listener: ListenerId, emitter: EmitterId, occlusion: f32) {
        self.hear_calls += 1;
        self.heard.insert((listener, emitter), occlusion);
    }

    fn set_reverb(&mut self, emitter: EmitterId, reverb: ReverbMix<'_>) {
        self.reverb.insert(
            emitter,
            (
                reverb.from.map(str::to_owned),
                reverb.to.map(str::to_owned),
                reverb.mix,
            ),
        );
    }
}
