//! Track representation.
//!
//! A track is an ordered sequence of notes bound to an instrument. Mute and
//! solo state is *not* stored here: audibility overrides live in the mixer,
//! keyed by track index, so a score stays a plain description of the piece.

use super::note::Note;
use serde::{Deserialize, Serialize};

/// Instrument assignment of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// General MIDI program number (0-127).
    pub number: u8,

    /// Whether this track is a percussion track (channel 10 in General
    /// MIDI). Percussion tracks get a drum substitute instrument.
    #[serde(default)]
    pub percussion: bool,
}

impl Instrument {
    /// Creates a melodic instrument with the given program number.
    pub fn program(number: u8) -> Self {
        Self {
            number: number.min(127),
            percussion: false,
        }
    }

    /// Creates a percussion instrument.
    pub fn percussion() -> Self {
        Self {
            number: 0,
            percussion: true,
        }
    }
}

/// A single track of a parsed MIDI file.
///
/// Notes are kept in insertion order, which the upstream parser produces
/// chronologically. The engine assumes but does not enforce this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Instrument assigned to this track.
    pub instrument: Instrument,

    /// Notes in this track.
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Track {
    /// Creates an empty track with the given instrument.
    pub fn new(instrument: Instrument) -> Self {
        Self {
            instrument,
            notes: Vec::new(),
        }
    }

    /// Returns the end tick of the last-ending note, or 0 for an empty track.
    pub fn duration_ticks(&self) -> u32 {
        self.notes.iter().map(|n| n.end_ticks()).max().unwrap_or(0)
    }

    /// Returns the number of notes in the track.
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Returns true if the track has no notes. The piano roll skips
    /// empty tracks entirely.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_duration() {
        let mut track = Track::new(Instrument::program(0));
        assert_eq!(track.duration_ticks(), 0);

        track
            .notes
            .push(Note::from_ticks(60, 1.0, 0, 480, 120.0, 480));
        track
            .notes
            .push(Note::from_ticks(62, 1.0, 960, 480, 120.0, 480));
        assert_eq!(track.duration_ticks(), 1440);
    }

    #[test]
    fn test_percussion_flag_defaults_false() {
        let json = r#"{"instrument": {"number": 24}, "notes": []}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert!(!track.instrument.percussion);
        assert!(track.is_empty());
    }
}
