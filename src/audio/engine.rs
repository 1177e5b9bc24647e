//! Note scheduling against the two playback strategies.
//!
//! The sample path submits every future note of every track to that
//! track's persistent instrument; solo/mute is applied afterwards through
//! the live gains, because the instruments stay loaded and reused across
//! plays. The synthesizer path instead filters tracks by the mix decision
//! up front, allocates one voice per eligible track, and disposes every
//! voice on stop.

use super::backend::{AudioBackend, InstrumentRegistry, SampleInstrument, ScheduledNote, Voice};
use super::PlaybackError;
use crate::mixer::Mixer;
use crate::score::Score;
use tracing::debug;

/// Schedules notes against an [`AudioBackend`] and owns the per-track
/// instrument registry plus the live voice collection.
pub struct PlaybackEngine<B: AudioBackend> {
    backend: B,
    instruments: InstrumentRegistry<B::Instrument>,
    voices: Vec<B::Voice>,
}

impl<B: AudioBackend> PlaybackEngine<B> {
    /// Creates an engine over the given backend with no instruments
    /// loaded and no active voices.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            instruments: InstrumentRegistry::new(),
            voices: Vec::new(),
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Installs a loaded instrument instance for a track.
    ///
    /// The caller re-applies the mix afterwards so the new instance
    /// starts at the right gain.
    pub fn install_instrument(&mut self, track: usize, instrument: B::Instrument) {
        self.instruments.install(track, instrument);
    }

    /// Returns true once a track's instrument is ready to schedule.
    pub fn instrument_ready(&self, track: usize) -> bool {
        self.instruments.is_ready(track)
    }

    /// Number of loaded instruments.
    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    /// Drops all loaded instruments. Used when a new score invalidates
    /// the track indices.
    pub fn clear_instruments(&mut self) {
        for (_, instrument) in self.instruments.iter_mut() {
            instrument.stop();
        }
        self.instruments.clear();
    }

    /// Re-applies the mix decision to every loaded instrument.
    ///
    /// Called whenever the solo set, mute set, or instrument set changes.
    pub fn apply_mix(&mut self, mixer: &Mixer) {
        for (track, instrument) in self.instruments.iter_mut() {
            instrument.set_gain(mixer.audible_gain(track));
        }
    }

    /// Schedules all future notes of every track against the persistent
    /// sampled instruments, anchored to one audio-clock reading.
    ///
    /// Notes that already started (`start_sec * 1000 < current_ms`) are
    /// skipped; the rest are submitted relative to the playhead.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InstrumentNotReady`] if any track with
    /// notes has no loaded instrument. Nothing is scheduled in that case.
    pub fn start_sample(&mut self, score: &Score, current_ms: f64) -> Result<(), PlaybackError> {
        for (track, _) in score.tracks.iter().enumerate().filter(|(_, t)| !t.is_empty()) {
            if !self.instruments.is_ready(track) {
                return Err(PlaybackError::InstrumentNotReady { track });
            }
        }

        let anchor = self.backend.now();
        let offset_sec = current_ms / 1000.0;

        for (track, data) in score.tracks.iter().enumerate() {
            let notes: Vec<ScheduledNote> = data
                .notes
                .iter()
                .filter(|n| n.start_sec * 1000.0 >= current_ms)
                .map(|n| ScheduledNote {
                    offset_sec: n.start_sec - offset_sec,
                    name: n.name.clone(),
                    duration_sec: n.duration_sec,
                })
                .collect();
            if let Some(instrument) = self.instruments.get_mut(track) {
                debug!(track, notes = notes.len(), "scheduling sampled track");
                instrument.schedule(anchor, &notes);
            }
        }
        Ok(())
    }

    /// Stops every sampled instrument, leaving the instances loaded.
    /// Idempotent; the playhead is owned by the transport, not here.
    pub fn stop_sample(&mut self) {
        for (_, instrument) in self.instruments.iter_mut() {
            instrument.stop();
        }
    }

    /// Allocates one voice per eligible track and schedules its future
    /// notes at absolute audio-clock times.
    ///
    /// Eligibility follows the mix decision at start time: muted tracks
    /// are excluded, and a non-empty solo set excludes every non-soloed
    /// track. Voices live until [`stop_synth`](Self::stop_synth).
    pub fn start_synth(&mut self, score: &Score, mixer: &Mixer, current_ms: f64) {
        let now = self.backend.now();
        let offset_sec = current_ms / 1000.0;

        for (track, data) in score.tracks.iter().enumerate() {
            if !mixer.is_audible(track) {
                continue;
            }
            let mut voice = self.backend.create_voice();
            for note in data.notes.iter().filter(|n| n.start_sec * 1000.0 >= current_ms) {
                voice.trigger_attack_release(
                    &note.name,
                    note.duration_sec,
                    note.start_sec + now - offset_sec,
                    note.velocity,
                );
            }
            self.voices.push(voice);
        }
        debug!(voices = self.voices.len(), "synth playback scheduled");
    }

    /// Disposes every live voice and clears the collection.
    /// Idempotent and safe with no voices active.
    pub fn stop_synth(&mut self) {
        for mut voice in self.voices.drain(..) {
            voice.dispose();
        }
    }

    /// Silences both strategies. Used on end-of-piece and hard stop.
    pub fn stop_all(&mut self) {
        self.stop_sample();
        self.stop_synth();
    }

    /// Number of voices allocated for the current synth play cycle.
    pub fn active_voice_count(&self) -> usize {
        self.voices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mock::{MockBackend, MockInstrument};
    use crate::score::{Instrument, Note, Score, Track};

    /// Two melodic tracks with one note each at 0.5 s and 2.0 s.
    fn two_track_score() -> Score {
        let mut score = Score::default();
        for start_ticks in [480u32, 1920] {
            let mut track = Track::new(Instrument::program(0));
            track
                .notes
                .push(Note::from_ticks(60, 0.8, start_ticks, 480, 120.0, 480));
            score.tracks.push(track);
        }
        score
    }

    fn engine_with_instruments(
        backend: MockBackend,
        count: usize,
    ) -> (PlaybackEngine<MockBackend>, Vec<MockInstrument>) {
        let mut engine = PlaybackEngine::new(backend);
        let mut handles = Vec::new();
        for track in 0..count {
            let instrument = MockInstrument::new();
            handles.push(instrument.clone());
            engine.install_instrument(track, instrument);
        }
        (engine, handles)
    }

    #[test]
    fn test_start_sample_schedules_future_notes_relative_to_playhead() {
        let (mut engine, handles) = engine_with_instruments(MockBackend::at(7.25), 2);
        let score = two_track_score();

        // Playhead at 1000 ms: the 0.5 s note already started, the 2.0 s
        // note is 1.0 s in the future.
        engine.start_sample(&score, 1000.0).unwrap();

        let first = handles[0].log.borrow();
        let (anchor, notes) = &first.schedules[0];
        assert_eq!(*anchor, 7.25);
        assert!(notes.is_empty());

        let second = handles[1].log.borrow();
        let (_, notes) = &second.schedules[0];
        assert_eq!(notes.len(), 1);
        assert!((notes[0].offset_sec - 1.0).abs() < 1e-9);
        assert_eq!(notes[0].name, "C4");
    }

    #[test]
    fn test_start_sample_requires_loaded_instruments() {
        let mut engine = PlaybackEngine::new(MockBackend::new());
        let score = two_track_score();
        engine.install_instrument(0, MockInstrument::new());

        let err = engine.start_sample(&score, 0.0).unwrap_err();
        assert!(matches!(err, PlaybackError::InstrumentNotReady { track: 1 }));
    }

    #[test]
    fn test_stop_sample_is_idempotent() {
        let (mut engine, handles) = engine_with_instruments(MockBackend::new(), 2);
        engine.stop_sample();
        engine.stop_sample();
        assert_eq!(handles[0].log.borrow().stops, 2);
        assert_eq!(handles[1].log.borrow().stops, 2);
    }

    #[test]
    fn test_apply_mix_sets_every_gain() {
        let (mut engine, handles) = engine_with_instruments(MockBackend::new(), 3);
        let mut mixer = Mixer::new();
        mixer.toggle_solo(1);
        engine.apply_mix(&mixer);

        assert_eq!(handles[0].last_gain(), Some(0.0));
        assert_eq!(handles[1].last_gain(), Some(1.0));
        assert_eq!(handles[2].last_gain(), Some(0.0));
    }

    #[test]
    fn test_start_synth_filters_by_mix_decision() {
        let backend = MockBackend::at(3.0);
        let log = std::rc::Rc::clone(&backend.voice_log);
        let mut engine = PlaybackEngine::new(backend);
        let score = two_track_score();

        let mut mixer = Mixer::new();
        mixer.toggle_mute(0);
        engine.start_synth(&score, &mixer, 0.0);

        // One voice for the unmuted track only.
        assert_eq!(engine.active_voice_count(), 1);
        let log = log.borrow();
        assert_eq!(log.created, 1);
        assert_eq!(log.triggered.len(), 1);
        // Absolute time: note start 2.0 s + clock 3.0 s - playhead 0.
        assert!((log.triggered[0].clock_sec - 5.0).abs() < 1e-9);
        assert!((log.triggered[0].velocity - 0.8).abs() < 1e-6);
        assert_eq!(log.triggered[0].name, "C4");
        assert!((log.triggered[0].duration_sec - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_start_synth_solo_excludes_other_tracks() {
        let backend = MockBackend::new();
        let log = std::rc::Rc::clone(&backend.voice_log);
        let mut engine = PlaybackEngine::new(backend);
        let score = two_track_score();

        let mut mixer = Mixer::new();
        mixer.toggle_solo(1);
        engine.start_synth(&score, &mixer, 0.0);

        assert_eq!(engine.active_voice_count(), 1);
        assert_eq!(log.borrow().triggered[0].voice, 0);
    }

    #[test]
    fn test_stop_synth_disposes_every_voice() {
        let backend = MockBackend::new();
        let log = std::rc::Rc::clone(&backend.voice_log);
        let mut engine = PlaybackEngine::new(backend);
        let score = two_track_score();

        engine.start_synth(&score, &Mixer::new(), 0.0);
        assert_eq!(engine.active_voice_count(), 2);

        engine.stop_synth();
        assert_eq!(engine.active_voice_count(), 0);
        assert_eq!(log.borrow().disposed, 2);

        // Safe with no voices active.
        engine.stop_synth();
        assert_eq!(log.borrow().disposed, 2);
    }

    #[test]
    fn test_clear_instruments_silences_first() {
        let (mut engine, handles) = engine_with_instruments(MockBackend::new(), 2);
        engine.clear_instruments();
        assert_eq!(engine.instrument_count(), 0);
        assert_eq!(handles[0].log.borrow().stops, 1);
    }
}
