//! Musical-time conversion.
//!
//! Pure mappings between ticks, milliseconds, bars, and beats for a fixed
//! (bpm, ticks-per-beat, beats-per-bar) triple. All derived playback
//! constants flow from here when a score is loaded.

use crate::score::Header;

/// Fixed timing constants of a loaded piece.
///
/// Callers must supply `bpm > 0`, `ticks_per_beat > 0`, and
/// `beats_per_bar > 0`; the constructors take these from a parsed file
/// header, which guarantees them upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timebase {
    /// Tempo in beats per minute.
    pub bpm: f64,

    /// Ticks per quarter-note beat (ppq).
    pub ticks_per_beat: u32,

    /// Beats per bar.
    pub beats_per_bar: u32,
}

impl Timebase {
    /// Creates a timebase from a parsed file header.
    pub fn from_header(header: &Header) -> Self {
        Self {
            bpm: header.bpm,
            ticks_per_beat: header.ppq,
            beats_per_bar: header.beats_per_bar,
        }
    }

    /// Milliseconds per beat at the fixed tempo.
    pub fn ms_per_beat(&self) -> f64 {
        60_000.0 / self.bpm
    }

    /// Milliseconds per bar.
    pub fn ms_per_bar(&self) -> f64 {
        self.ms_per_beat() * self.beats_per_bar as f64
    }

    /// Ticks per bar.
    pub fn ticks_per_bar(&self) -> u32 {
        self.ticks_per_beat * self.beats_per_bar
    }

    /// Total bar count for a piece of the given tick length, rounded to
    /// the nearest multiple of 4 bars (phrases come in 4-bar units), and
    /// never less than 4.
    ///
    /// Rounding can truncate trailing notes of a piece whose true length
    /// is not a 4-bar phrase; that length is fixed at load time and never
    /// revisited.
    pub fn total_bars(&self, duration_ticks: u32) -> u32 {
        let bars = duration_ticks as f64
            / self.ticks_per_beat as f64
            / self.beats_per_bar as f64;
        let phrases = (bars / 4.0).round().max(1.0);
        phrases as u32 * 4
    }

    /// Total duration in milliseconds for the given bar count.
    pub fn total_ms(&self, total_bars: u32) -> f64 {
        self.ms_per_beat() * self.beats_per_bar as f64 * total_bars as f64
    }

    /// The bar containing a tick position.
    pub fn bar_index(&self, ticks: u32) -> u32 {
        ticks / self.ticks_per_bar()
    }

    /// Offset of a tick position from the start of a given bar.
    pub fn tick_offset_in_bar(&self, ticks: u32, bar_index: u32) -> u32 {
        ticks.saturating_sub(self.ticks_per_bar() * bar_index)
    }
}

impl Default for Timebase {
    fn default() -> Self {
        Self::from_header(&Header::default())
    }
}
