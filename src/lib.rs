//! midiroll - Transport, timing, mixing, and note-layout engine for a
//! multi-track MIDI piano roll.
//!
//! This library owns the non-visual core of a piano-roll editor/player:
//! musical-time conversion, playback transport state, per-track solo/mute
//! routing, note geometry within bars, and scheduling against two audio
//! backends (persistent sampled instruments, per-play synthesizer voices).

pub mod audio;
pub mod mixer;
pub mod player;
pub mod roll;
pub mod score;
pub mod time;
pub mod transport;

// Re-export commonly used types
pub use audio::{engine::PlaybackEngine, AudioBackend, PlaybackError, SoundFontBackend};
pub use mixer::Mixer;
pub use player::{InstrumentRequest, Player};
pub use roll::{note_rect, Highlights, NoteRect, NoteStyle};
pub use score::{Header, Note, Score, Track};
pub use time::Timebase;
pub use transport::{Transport, TransportState, TICK_MS};
