//! Note representation.
//!
//! A note carries two derivable views of the same event: tick-based timing
//! (used for geometry within bars) and second-based timing (used when
//! scheduling against the audio backends). Both views are fixed at parse
//! time under the file's tempo and resolution and must stay consistent.

use serde::{Deserialize, Serialize};

/// A single note of a parsed MIDI track.
///
/// Field names follow the camelCase JSON shape produced by the upstream
/// file parser, so a parsed file object deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// MIDI note number (0-127). 60 = Middle C (C4).
    #[serde(rename = "midi")]
    pub pitch: u8,

    /// Display pitch name like "C4" or "F#5". Playback backends are
    /// scheduled by name, not by number.
    pub name: String,

    /// Start time in seconds from the beginning of the piece.
    #[serde(rename = "time")]
    pub start_sec: f64,

    /// Sounding length in seconds.
    #[serde(rename = "duration")]
    pub duration_sec: f64,

    /// Start time in ticks from the beginning of the piece.
    #[serde(rename = "ticks")]
    pub start_ticks: u32,

    /// Sounding length in ticks.
    pub duration_ticks: u32,

    /// Normalized velocity in [0, 1].
    pub velocity: f32,
}

impl Note {
    /// Creates a note from its tick timing, deriving the second-based view
    /// from the given tempo and resolution.
    ///
    /// # Arguments
    ///
    /// * `pitch` - MIDI note number (0-127)
    /// * `velocity` - Normalized velocity in [0, 1]
    /// * `start_ticks` - Start position in ticks
    /// * `duration_ticks` - Duration in ticks
    /// * `bpm` - Tempo in beats per minute
    /// * `ticks_per_beat` - Resolution (ppq)
    pub fn from_ticks(
        pitch: u8,
        velocity: f32,
        start_ticks: u32,
        duration_ticks: u32,
        bpm: f64,
        ticks_per_beat: u32,
    ) -> Self {
        let sec_per_tick = 60.0 / bpm / ticks_per_beat as f64;
        Self {
            pitch: pitch.min(127),
            name: super::pitch_to_name(pitch.min(127)),
            start_sec: start_ticks as f64 * sec_per_tick,
            duration_sec: duration_ticks as f64 * sec_per_tick,
            start_ticks,
            duration_ticks,
            velocity: velocity.clamp(0.0, 1.0),
        }
    }

    /// Returns the end tick of this note (start + duration).
    pub fn end_ticks(&self) -> u32 {
        self.start_ticks.saturating_add(self.duration_ticks)
    }

    /// Returns the end of the note's time window in seconds.
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.duration_sec
    }

    /// Checks if the note's time window contains a given second position.
    pub fn is_sounding_at(&self, sec: f64) -> bool {
        sec >= self.start_sec && sec < self.end_sec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ticks_derives_seconds() {
        // At 120 BPM with 480 ppq, one beat = 0.5 s.
        let note = Note::from_ticks(60, 0.8, 480, 960, 120.0, 480);
        assert_eq!(note.name, "C4");
        assert!((note.start_sec - 0.5).abs() < 1e-9);
        assert!((note.duration_sec - 1.0).abs() < 1e-9);
        assert_eq!(note.end_ticks(), 1440);
    }

    #[test]
    fn test_clamping() {
        let note = Note::from_ticks(200, 1.5, 0, 10, 120.0, 480);
        assert_eq!(note.pitch, 127);
        assert_eq!(note.velocity, 1.0);
    }

    #[test]
    fn test_is_sounding_at() {
        let note = Note::from_ticks(60, 1.0, 480, 480, 120.0, 480); // 0.5s - 1.0s
        assert!(!note.is_sounding_at(0.49));
        assert!(note.is_sounding_at(0.5));
        assert!(note.is_sounding_at(0.99));
        assert!(!note.is_sounding_at(1.0));
    }

    #[test]
    fn test_json_field_names() {
        let json = r#"{
            "midi": 64,
            "name": "E4",
            "time": 1.25,
            "duration": 0.5,
            "ticks": 1200,
            "durationTicks": 480,
            "velocity": 0.7874
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.pitch, 64);
        assert_eq!(note.start_ticks, 1200);
        assert_eq!(note.duration_ticks, 480);
        assert!((note.start_sec - 1.25).abs() < 1e-9);
    }
}
