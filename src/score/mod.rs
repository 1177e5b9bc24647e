//! Score data structures for a parsed multi-track MIDI piece.
//!
//! This module provides the core types for representing the notes, tracks,
//! and header of an already-parsed MIDI file. The score is an input object:
//! the engine never mutates it in place, and structural edits produce a new
//! `Score` value.

mod file;
mod note;
mod track;

pub use file::{Header, Score};
pub use note::Note;
pub use track::{Instrument, Track};

/// Standard MIDI note names for display purposes.
/// Maps MIDI note number (0-127) to note name within an octave.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Converts a MIDI note number to a human-readable note name with octave.
///
/// # Arguments
///
/// * `pitch` - MIDI note number (0-127)
///
/// # Returns
///
/// String representation like "C4" or "F#5"
///
/// # Examples
///
/// ```
/// use midiroll::score::pitch_to_name;
///
/// let name = pitch_to_name(60); // Middle C
/// assert_eq!(name, "C4");
/// ```
pub fn pitch_to_name(pitch: u8) -> String {
    let octave = (pitch / 12) as i8 - 1; // MIDI octave convention
    let note_index = (pitch % 12) as usize;
    format!("{}{}", NOTE_NAMES[note_index], octave)
}

/// Converts a note name to MIDI note number.
///
/// Both playback backends are scheduled by note name, so the concrete
/// backend needs the reverse mapping when turning scheduled notes into
/// synthesizer events.
///
/// # Arguments
///
/// * `name` - Note name like "C4" or "F#5"
///
/// # Returns
///
/// MIDI note number (0-127) or None if invalid
pub fn name_to_pitch(name: &str) -> Option<u8> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    // Find where the octave number starts
    let octave_start = name.chars().position(|c| c.is_ascii_digit() || c == '-')?;

    let note_part = &name[..octave_start];
    let octave_part = &name[octave_start..];

    let note_index = NOTE_NAMES.iter().position(|&n| n == note_part)?;
    let octave: i8 = octave_part.parse().ok()?;

    // MIDI note = (octave + 1) * 12 + note_index
    let midi_note = (octave + 1) as i16 * 12 + note_index as i16;
    if (0..=127).contains(&midi_note) {
        Some(midi_note as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_to_name() {
        assert_eq!(pitch_to_name(60), "C4");
        assert_eq!(pitch_to_name(69), "A4");
        assert_eq!(pitch_to_name(0), "C-1");
        assert_eq!(pitch_to_name(127), "G9");
    }

    #[test]
    fn test_name_to_pitch() {
        assert_eq!(name_to_pitch("C4"), Some(60));
        assert_eq!(name_to_pitch("A4"), Some(69));
        assert_eq!(name_to_pitch("C-1"), Some(0));
        assert_eq!(name_to_pitch("H4"), None);
        assert_eq!(name_to_pitch(""), None);
    }

    #[test]
    fn test_name_round_trip() {
        for pitch in 0..=127u8 {
            assert_eq!(name_to_pitch(&pitch_to_name(pitch)), Some(pitch));
        }
    }
}
