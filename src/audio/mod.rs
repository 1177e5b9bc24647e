//! Audio scheduling contracts and backends.
//!
//! The engine schedules against two rendering strategies with different
//! lifecycles: persistent per-track sampled instruments whose live gain is
//! modulated continuously, and synthesizer voices allocated fresh for each
//! play/stop cycle. Both are expressed as capabilities of an
//! [`AudioBackend`], so the engine itself stays free of any concrete audio
//! stack; `synth` provides the SoundFont-based implementation.

pub mod backend;
pub mod engine;
pub mod synth;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::{
    AudioBackend, InstrumentRegistry, SampleInstrument, ScheduledNote, Voice,
};
pub use engine::PlaybackEngine;
pub use synth::SoundFontBackend;

use thiserror::Error;

/// Errors surfaced by playback scheduling.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// A track was scheduled before its instrument instance finished
    /// loading. Loading happens eagerly at score load, so this is a
    /// precondition violation, not a recoverable condition.
    #[error("instrument for track {track} is not loaded yet")]
    InstrumentNotReady {
        /// Index of the offending track.
        track: usize,
    },
}
