//! Parsed-file container and structural edits.
//!
//! A `Score` is the engine's input: the header constants plus the ordered
//! track list of a fully-parsed MIDI file. The engine treats it as
//! immutable; the one structural edit (track removal) clones and returns a
//! new `Score`, leaving the original untouched so the caller can decide
//! whether to propagate it back through the pipeline.

use super::track::Track;
use serde::{Deserialize, Serialize};

/// Timing constants of a parsed file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Tempo in beats per minute.
    pub bpm: f64,

    /// Ticks per quarter-note beat (ppq).
    pub ppq: u32,

    /// Beats per bar, the first time-signature numerator.
    pub beats_per_bar: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            ppq: 480,
            beats_per_bar: 4,
        }
    }
}

/// A complete parsed multi-track MIDI piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Timing constants.
    pub header: Header,

    /// Ordered track list.
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Score {
    /// Creates an empty score with the given header.
    pub fn new(header: Header) -> Self {
        Self {
            header,
            tracks: Vec::new(),
        }
    }

    /// Returns the total duration of the piece in ticks.
    /// This is the maximum end tick across all tracks.
    pub fn duration_ticks(&self) -> u32 {
        self.tracks
            .iter()
            .map(|t| t.duration_ticks())
            .max()
            .unwrap_or(0)
    }

    /// Returns a reference to a track by index.
    pub fn track_at(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Returns the number of tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Returns a new score with the track at `index` removed.
    ///
    /// All other tracks and the header are carried over unchanged, in
    /// their original order. The input score is not mutated. An
    /// out-of-range index yields an identical copy.
    ///
    /// The caller owns confirmation before invoking this edit, and owns
    /// feeding the new score back through loading (which re-derives all
    /// timing constants and resets the transport to 0).
    pub fn without_track(&self, index: usize) -> Score {
        let mut edited = self.clone();
        if index < edited.tracks.len() {
            edited.tracks.remove(index);
        }
        edited
    }

    /// Parses a score from the JSON shape the upstream file parser emits.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON does not match the expected shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the score to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new(Header::default())
    }
}
