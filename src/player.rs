//! Player facade.
//!
//! Owns the loaded score, the derived timing constants, the transport, the
//! mixer, and the playback engine, and keeps them consistent: transport
//! transitions start and silence the backends, mix toggles re-apply gains,
//! and structural edits restart the whole derivation pipeline.

use crate::audio::{AudioBackend, PlaybackEngine, PlaybackError};
use crate::mixer::Mixer;
use crate::score::{Instrument, Score};
use crate::time::Timebase;
use crate::transport::{Transport, TransportState};
use tracing::debug;

/// An instrument the caller must load (asynchronously) before playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentRequest {
    /// Track index the loaded instance belongs to.
    pub track: usize,

    /// Instrument to load, including the percussion substitution flag.
    pub instrument: Instrument,
}

/// Coordinates score, transport, mixer, and playback engine.
pub struct Player<B: AudioBackend> {
    score: Score,
    timebase: Timebase,
    transport: Transport,
    mixer: Mixer,
    engine: PlaybackEngine<B>,
}

impl<B: AudioBackend> Player<B> {
    /// Creates a player with an empty score.
    pub fn new(backend: B) -> Self {
        let score = Score::default();
        let timebase = Timebase::from_header(&score.header);
        let transport = Transport::new(&timebase, 0);
        Self {
            score,
            timebase,
            transport,
            mixer: Mixer::new(),
            engine: PlaybackEngine::new(backend),
        }
    }

    /// Loads a new score, re-deriving all timing constants and resetting
    /// the playhead to 0.
    ///
    /// Previously loaded instruments are dropped because their track
    /// indices no longer apply. Returns the instruments the caller must
    /// load eagerly; playback must not start until they are installed.
    /// Solo/mute overrides survive the load.
    pub fn load(&mut self, score: Score) -> Vec<InstrumentRequest> {
        self.engine.stop_all();
        self.engine.clear_instruments();

        self.timebase = Timebase::from_header(&score.header);
        self.transport = Transport::new(&self.timebase, score.duration_ticks());
        self.score = score;

        debug!(
            tracks = self.score.track_count(),
            total_bars = self.transport.total_bars(),
            "score loaded"
        );

        self.score
            .tracks
            .iter()
            .enumerate()
            .map(|(track, data)| InstrumentRequest {
                track,
                instrument: data.instrument,
            })
            .collect()
    }

    /// The loaded score.
    pub fn score(&self) -> &Score {
        &self.score
    }

    /// Timing constants of the loaded score.
    pub fn timebase(&self) -> &Timebase {
        &self.timebase
    }

    /// The transport, for position/progress display and note layout.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The mixer, for solo/mute toggle state display.
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Installs a loaded instrument instance for a track and brings its
    /// gain in line with the current mix.
    pub fn install_instrument(&mut self, track: usize, instrument: B::Instrument) {
        self.engine.install_instrument(track, instrument);
        self.engine.apply_mix(&self.mixer);
    }

    /// Returns true once a track's instrument is ready.
    pub fn instrument_ready(&self, track: usize) -> bool {
        self.engine.instrument_ready(track)
    }

    /// Starts sampled-instrument playback from the current position.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InstrumentNotReady`] if a track's
    /// instrument has not been installed; the transport stays stopped.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.transport.is_stopped() {
            return Ok(());
        }
        self.engine
            .start_sample(&self.score, self.transport.current_ms())?;
        self.transport.begin_sample();
        Ok(())
    }

    /// Pauses sampled-instrument playback, retaining the position.
    pub fn pause(&mut self) {
        if self.transport.pause_sample() {
            self.engine.stop_sample();
        }
    }

    /// Toggles between play and pause, the sample-backend play button.
    pub fn toggle_play(&mut self) -> Result<(), PlaybackError> {
        if self.transport.state() == TransportState::PlayingSample {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Stops playback from any state and resets the playhead to 0.
    /// Safe to call while already stopped.
    pub fn stop(&mut self) {
        self.engine.stop_all();
        self.transport.stop();
    }

    /// Toggles synthesizer playback: from stopped, allocates voices for
    /// every audible track and plays from the current position; while
    /// playing, disposes every voice and resets the playhead.
    ///
    /// Ignored while the sample backend is rendering (the triggering
    /// control is disabled upstream in that state).
    pub fn toggle_synth(&mut self) {
        match self.transport.state() {
            TransportState::Stopped => {
                self.engine
                    .start_synth(&self.score, &self.mixer, self.transport.current_ms());
                self.transport.begin_synth();
            }
            TransportState::PlayingSynth => {
                self.engine.stop_synth();
                self.transport.stop();
            }
            TransportState::PlayingSample => {}
        }
    }

    /// Advances the clock by one 100 ms tick and silences the backends
    /// when the end of the piece is reached.
    pub fn tick(&mut self) {
        if self.transport.tick() {
            self.engine.stop_all();
        }
    }

    /// Toggles solo for a track and re-applies gains to the live
    /// instruments.
    pub fn toggle_solo(&mut self, track: usize) {
        self.mixer.toggle_solo(track);
        self.engine.apply_mix(&self.mixer);
    }

    /// Toggles mute for a track and re-applies gains to the live
    /// instruments.
    pub fn toggle_mute(&mut self, track: usize) {
        self.mixer.toggle_mute(track);
        self.engine.apply_mix(&self.mixer);
    }

    /// Removes a track and reloads the edited score through the full
    /// derivation pipeline. The caller confirms the edit beforehand.
    ///
    /// Returns the instrument requests for the new track list.
    pub fn remove_track(&mut self, track: usize) -> Vec<InstrumentRequest> {
        let edited = self.score.without_track(track);
        self.load(edited)
    }

    /// Snaps to the start of the previous bar (stopped only).
    pub fn rewind(&mut self) {
        self.transport.rewind();
    }

    /// Snaps to the start of the next bar (stopped only).
    pub fn forward(&mut self) {
        self.transport.forward();
    }

    /// Moves the playhead to the start of the piece (stopped only).
    pub fn to_beginning(&mut self) {
        self.transport.to_beginning();
    }

    /// Moves the playhead to the end of the piece (stopped only).
    pub fn to_end(&mut self) {
        self.transport.to_end();
    }
}
