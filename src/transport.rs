//! Playback transport state.
//!
//! Owns the playhead position and the play/pause/stop flags for both
//! rendering backends. Position advances on a cooperative 100 ms tick
//! driven by whatever timer the host environment provides; every tick also
//! runs the end-of-piece check, so the clock never observably exceeds the
//! total duration between renders.

use crate::time::Timebase;
use tracing::debug;

/// Period of the cooperative clock tick in milliseconds.
pub const TICK_MS: f64 = 100.0;

/// Transport state. At most one backend renders at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Not playing. Position is retained (pause) or reset (stop/end).
    Stopped,
    /// The persistent sampled-instrument backend is rendering.
    PlayingSample,
    /// The per-play synthesizer backend is rendering.
    PlayingSynth,
}

/// Playhead and derived timing constants for a loaded piece.
///
/// Created when a score is loaded; the position resets to 0 on load, on
/// stop, and on reaching the end of the piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    current_ms: f64,
    total_ms: f64,
    ms_per_beat: f64,
    ms_per_bar: f64,
    ticks_per_beat: u32,
    beats_per_bar: u32,
    total_bars: u32,
    state: TransportState,
}

impl Transport {
    /// Creates a transport for a piece of the given tick length,
    /// deriving the bar count from the timebase.
    pub fn new(timebase: &Timebase, duration_ticks: u32) -> Self {
        Self::with_total_bars(timebase, timebase.total_bars(duration_ticks))
    }

    /// Creates a transport with an explicit bar count.
    pub fn with_total_bars(timebase: &Timebase, total_bars: u32) -> Self {
        Self {
            current_ms: 0.0,
            total_ms: timebase.total_ms(total_bars),
            ms_per_beat: timebase.ms_per_beat(),
            ms_per_bar: timebase.ms_per_bar(),
            ticks_per_beat: timebase.ticks_per_beat,
            beats_per_bar: timebase.beats_per_bar,
            total_bars,
            state: TransportState::Stopped,
        }
    }

    /// Current playhead position in milliseconds.
    pub fn current_ms(&self) -> f64 {
        self.current_ms
    }

    /// Current playhead position in seconds.
    pub fn current_sec(&self) -> f64 {
        self.current_ms / 1000.0
    }

    /// Total duration in milliseconds.
    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Total bar count, a multiple of 4.
    pub fn total_bars(&self) -> u32 {
        self.total_bars
    }

    /// Ticks per quarter-note beat.
    pub fn ticks_per_beat(&self) -> u32 {
        self.ticks_per_beat
    }

    /// Beats per bar.
    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    /// Ticks per bar.
    pub fn ticks_per_bar(&self) -> u32 {
        self.ticks_per_beat * self.beats_per_bar
    }

    /// The bar currently under the playhead.
    ///
    /// A degenerate (zero or negative) total duration yields bar 0 rather
    /// than propagating NaN through the division.
    pub fn current_bar(&self) -> u32 {
        if self.total_ms <= 0.0 {
            return 0;
        }
        (self.current_ms / (self.total_ms / self.total_bars as f64)) as u32
    }

    /// Playhead position as a percent of the total duration, for the
    /// progress bar. Degenerate durations report 0%.
    pub fn progress_percent(&self) -> f64 {
        if self.total_ms <= 0.0 {
            return 0.0;
        }
        self.current_ms / self.total_ms * 100.0
    }

    /// Current transport state.
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Returns true while either backend is rendering.
    pub fn is_playing(&self) -> bool {
        self.state != TransportState::Stopped
    }

    /// Returns true when stopped or paused.
    pub fn is_stopped(&self) -> bool {
        self.state == TransportState::Stopped
    }

    /// Enters sampled-instrument playback from the current position.
    /// Only valid while stopped; returns false otherwise.
    pub fn begin_sample(&mut self) -> bool {
        if self.state != TransportState::Stopped {
            return false;
        }
        debug!(position_ms = self.current_ms, "sample playback started");
        self.state = TransportState::PlayingSample;
        true
    }

    /// Pauses sampled-instrument playback, retaining the position.
    /// Returns false unless the sample backend was rendering.
    pub fn pause_sample(&mut self) -> bool {
        if self.state != TransportState::PlayingSample {
            return false;
        }
        debug!(position_ms = self.current_ms, "sample playback paused");
        self.state = TransportState::Stopped;
        true
    }

    /// Enters synthesizer playback from the current position.
    /// Only valid while stopped; returns false otherwise.
    pub fn begin_synth(&mut self) -> bool {
        if self.state != TransportState::Stopped {
            return false;
        }
        debug!(position_ms = self.current_ms, "synth playback started");
        self.state = TransportState::PlayingSynth;
        true
    }

    /// Stops playback from any state and resets the position to 0.
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.current_ms = 0.0;
    }

    /// Advances the clock by one tick period while playing, then runs the
    /// end-of-piece check regardless of state.
    ///
    /// Returns true when the check forced a stop; the caller must then
    /// silence whichever backend was rendering.
    pub fn tick(&mut self) -> bool {
        if self.is_playing() {
            self.current_ms += TICK_MS;
        }
        if self.current_ms >= self.total_ms {
            debug!(total_ms = self.total_ms, "end of piece reached");
            self.stop();
            return true;
        }
        false
    }

    /// Snaps the playhead to the start of the previous bar.
    /// Navigation is only permitted while stopped.
    pub fn rewind(&mut self) {
        if !self.is_stopped() || self.current_ms - self.ms_per_beat <= 0.0 {
            return;
        }
        self.current_ms = ((self.current_ms / self.ms_per_bar).ceil() - 1.0) * self.ms_per_bar;
    }

    /// Snaps the playhead to the start of the next bar.
    /// Navigation is only permitted while stopped.
    pub fn forward(&mut self) {
        if !self.is_stopped() || self.current_ms + self.ms_per_beat >= self.total_ms {
            return;
        }
        self.current_ms = ((self.current_ms / self.ms_per_bar).floor() + 1.0) * self.ms_per_bar;
    }

    /// Moves the playhead to the start of the piece.
    pub fn to_beginning(&mut self) {
        if self.is_stopped() {
            self.current_ms = 0.0;
        }
    }

    /// Moves the playhead to the end of the piece.
    pub fn to_end(&mut self) {
        if self.is_stopped() {
            self.current_ms = self.total_ms;
        }
    }

    /// Moves the playhead to an arbitrary position, clamped to the piece.
    pub fn seek_ms(&mut self, ms: f64) {
        if self.is_stopped() {
            self.current_ms = ms.clamp(0.0, self.total_ms);
        }
    }
}
