//! Backend capability traits and the per-track instrument registry.

use std::collections::HashMap;

/// A note handed to a sampled instrument, relative to a schedule anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNote {
    /// Offset in seconds from the schedule anchor.
    pub offset_sec: f64,

    /// Pitch name like "C4"; backends resolve names to their own events.
    pub name: String,

    /// Sounding length in seconds.
    pub duration_sec: f64,
}

/// A pre-loaded per-track instrument instance.
///
/// Instances persist across play/pause/stop cycles; audibility is
/// controlled through the live gain rather than by skipping scheduling.
pub trait SampleInstrument {
    /// Schedules a batch of notes anchored at an audio-clock reading.
    fn schedule(&mut self, clock_sec: f64, notes: &[ScheduledNote]);

    /// Cancels everything scheduled and silences the instrument.
    /// Safe to call when nothing is scheduled.
    fn stop(&mut self);

    /// Sets the live output gain (0 = silent, 1 = full volume).
    fn set_gain(&mut self, gain: f32);
}

/// A synthesizer voice producer created for a single play cycle.
pub trait Voice {
    /// Schedules one note at an absolute audio-clock time.
    fn trigger_attack_release(
        &mut self,
        name: &str,
        duration_sec: f64,
        clock_sec: f64,
        velocity: f32,
    );

    /// Releases the voice's resources. Called exactly once per voice at
    /// the end of its play cycle.
    fn dispose(&mut self);
}

/// Capability bundle a concrete audio stack provides to the engine:
/// a monotonic clock, per-track instruments, and a voice factory.
pub trait AudioBackend {
    /// Persistent per-track instrument type.
    type Instrument: SampleInstrument;

    /// Per-play-cycle voice type.
    type Voice: Voice;

    /// Reads the monotonic audio clock in seconds. Scheduling anchors are
    /// read once per scheduling pass, not per note.
    fn now(&self) -> f64;

    /// Creates a fresh synthesizer voice.
    fn create_voice(&mut self) -> Self::Voice;
}

/// Owned registry of loaded instrument instances, keyed by track index.
///
/// The registry is shared between playback scheduling (reads) and mix
/// routing (gain writes). Execution is single-threaded and cooperative,
/// so per-entry updates never interleave observably.
#[derive(Debug, Default)]
pub struct InstrumentRegistry<I> {
    entries: HashMap<usize, I>,
}

impl<I> InstrumentRegistry<I> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Installs a loaded instrument for a track, replacing any previous
    /// instance. Loading completes asynchronously relative to the engine,
    /// so instruments arrive here one at a time.
    pub fn install(&mut self, track: usize, instrument: I) {
        self.entries.insert(track, instrument);
    }

    /// Returns true once a track's instrument is ready to schedule.
    pub fn is_ready(&self, track: usize) -> bool {
        self.entries.contains_key(&track)
    }

    /// Mutable access to one track's instrument.
    pub fn get_mut(&mut self, track: usize) -> Option<&mut I> {
        self.entries.get_mut(&track)
    }

    /// Iterates over all loaded instruments.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut I)> {
        self.entries.iter_mut().map(|(idx, inst)| (*idx, inst))
    }

    /// Drops every instance. Used when a new score replaces the track
    /// list and the old instruments no longer match the indices.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of loaded instruments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no instruments are loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
