//! SoundFont-based audio backend.
//!
//! Implements the backend capability on top of rustysynth for synthesis
//! and rodio for audio output. Scheduling is sample-accurate: the rodio
//! source counts rendered frames, and that count is the process-wide
//! monotonic audio clock all scheduling anchors are read from.

use super::backend::{AudioBackend, SampleInstrument, ScheduledNote, Voice};
use crate::score::{name_to_pitch, Instrument};
use anyhow::{Context, Result};
use rodio::{OutputStream, OutputStreamHandle, Source};
use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

/// Sample rate for audio synthesis (44.1 kHz standard).
pub const SAMPLE_RATE: u32 = 44100;

/// Audio buffer size for low-latency playback.
/// Smaller = lower latency but higher CPU usage.
const BUFFER_SIZE: usize = 256;

/// General MIDI drum channel.
const DRUM_CHANNEL: u8 = 9;

/// Default key-on velocity for sampled notes, which are scheduled without
/// per-note dynamics.
const SAMPLE_VELOCITY: i32 = 100;

/// A queued synthesizer event, timed against the audio clock.
#[derive(Debug, Clone, Copy)]
struct TimedEvent {
    at_sec: f64,
    channel: u8,
    pitch: u8,
    /// Key-on velocity; 0 means note off.
    velocity: u8,
}

type EventQueue = Arc<Mutex<Vec<TimedEvent>>>;
type SharedSynth = Arc<Mutex<Synthesizer>>;

/// Audio source that fires due events and renders the synthesizer.
/// Implements rodio's Source trait for playback.
struct SynthSource {
    synth: SharedSynth,
    queue: EventQueue,
    /// Total frames rendered; the backend reads this as its clock.
    frames: Arc<AtomicU64>,
    left_buf: Vec<f32>,
    right_buf: Vec<f32>,
    buf_pos: usize,
    /// Current channel (0 = left, 1 = right).
    channel: usize,
}

impl SynthSource {
    fn new(synth: SharedSynth, queue: EventQueue, frames: Arc<AtomicU64>) -> Self {
        Self {
            synth,
            queue,
            frames,
            left_buf: vec![0.0; BUFFER_SIZE],
            right_buf: vec![0.0; BUFFER_SIZE],
            buf_pos: BUFFER_SIZE, // Start at end to trigger first render
            channel: 0,
        }
    }

    /// Applies every event due by the current clock reading, then renders
    /// one buffer of stereo samples.
    fn render_block(&mut self) {
        let now_sec = self.frames.load(Ordering::Relaxed) as f64 / SAMPLE_RATE as f64;

        if let (Ok(mut queue), Ok(mut synth)) = (self.queue.lock(), self.synth.lock()) {
            let mut i = 0;
            while i < queue.len() {
                if queue[i].at_sec <= now_sec {
                    let event = queue.swap_remove(i);
                    if event.velocity > 0 {
                        synth.note_on(
                            event.channel as i32,
                            event.pitch as i32,
                            event.velocity as i32,
                        );
                    } else {
                        synth.note_off(event.channel as i32, event.pitch as i32);
                    }
                } else {
                    i += 1;
                }
            }
            synth.render(&mut self.left_buf, &mut self.right_buf);
        } else {
            // Only fill with silence if we can't get the locks
            self.left_buf.fill(0.0);
            self.right_buf.fill(0.0);
        }

        self.frames
            .fetch_add(BUFFER_SIZE as u64, Ordering::Relaxed);
        self.buf_pos = 0;
    }
}

impl Iterator for SynthSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        // Render a new buffer when we've exhausted the current one
        if self.buf_pos >= BUFFER_SIZE {
            self.render_block();
        }

        // Interleave stereo samples: L, R, L, R, ...
        let sample = if self.channel == 0 {
            self.left_buf[self.buf_pos]
        } else {
            self.right_buf[self.buf_pos]
        };

        // Advance to next channel/sample
        self.channel = 1 - self.channel;
        if self.channel == 0 {
            self.buf_pos += 1;
        }

        Some(sample)
    }
}

impl Source for SynthSource {
    fn current_frame_len(&self) -> Option<usize> {
        None // Continuous stream
    }

    fn channels(&self) -> u16 {
        2 // Stereo
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None // Infinite stream
    }
}

/// One synthesizer channel playing the role of a per-track instrument or
/// a per-play voice.
///
/// The shared queue and synthesizer are the resource both playback
/// scheduling and mix routing touch; each method takes the per-entry lock
/// once, so writes land atomically per channel.
pub struct SynthChannel {
    channel: u8,
    synth: SharedSynth,
    queue: EventQueue,
}

impl SynthChannel {
    /// Removes this channel's pending events and silences its held notes.
    fn cancel(&mut self) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.retain(|e| e.channel != self.channel);
        }
        if let Ok(mut synth) = self.synth.lock() {
            // Control change 123 is all-notes-off
            synth.process_midi_message(self.channel as i32, 0xB0, 123, 0);
        }
    }

    fn push_note(&mut self, at_sec: f64, pitch: u8, velocity: u8, duration_sec: f64) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(TimedEvent {
                at_sec,
                channel: self.channel,
                pitch,
                velocity: velocity.max(1),
            });
            queue.push(TimedEvent {
                at_sec: at_sec + duration_sec,
                channel: self.channel,
                pitch,
                velocity: 0,
            });
        }
    }
}

impl SampleInstrument for SynthChannel {
    fn schedule(&mut self, clock_sec: f64, notes: &[ScheduledNote]) {
        for note in notes {
            let Some(pitch) = name_to_pitch(&note.name) else {
                warn!(name = %note.name, "unparseable note name, skipping");
                continue;
            };
            self.push_note(
                clock_sec + note.offset_sec,
                pitch,
                SAMPLE_VELOCITY as u8,
                note.duration_sec,
            );
        }
    }

    fn stop(&mut self) {
        self.cancel();
    }

    fn set_gain(&mut self, gain: f32) {
        if let Ok(mut synth) = self.synth.lock() {
            // Control change 7 is volume
            let volume = (gain.clamp(0.0, 1.0) * 127.0) as i32;
            synth.process_midi_message(self.channel as i32, 0xB0, 7, volume);
        }
    }
}

impl Voice for SynthChannel {
    fn trigger_attack_release(
        &mut self,
        name: &str,
        duration_sec: f64,
        clock_sec: f64,
        velocity: f32,
    ) {
        let Some(pitch) = name_to_pitch(name) else {
            warn!(name = %name, "unparseable note name, skipping");
            return;
        };
        let velocity = (velocity.clamp(0.0, 1.0) * 127.0) as u8;
        self.push_note(clock_sec, pitch, velocity, duration_sec);
    }

    fn dispose(&mut self) {
        self.cancel();
    }
}

/// The SoundFont audio backend: one synthesizer, one output stream, and a
/// channel allocator handing out instruments and voices.
pub struct SoundFontBackend {
    synth: SharedSynth,
    queue: EventQueue,
    frames: Arc<AtomicU64>,
    /// Audio output stream (must be kept alive).
    _stream: OutputStream,
    _stream_handle: OutputStreamHandle,
    /// Next channel for auto-assignment. Skips the drum channel for
    /// melodic use.
    next_channel: u8,
    /// Which program numbers the SoundFont's bank 0 actually provides.
    available_programs: [bool; 128],
    /// Instrument names extracted from the loaded SoundFont.
    /// Indexed by program number (0-127). Falls back to "Program N".
    instrument_names: [String; 128],
}

impl SoundFontBackend {
    /// Creates a backend with the specified SoundFont.
    ///
    /// # Arguments
    ///
    /// * `soundfont_path` - Path to the SoundFont file (.sf2)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The SoundFont file cannot be read
    /// - The SoundFont is invalid
    /// - Audio output cannot be initialized
    pub fn new<P: AsRef<Path>>(soundfont_path: P) -> Result<Self> {
        let mut file = BufReader::new(File::open(soundfont_path.as_ref()).with_context(|| {
            format!(
                "Failed to open SoundFont: {}",
                soundfont_path.as_ref().display()
            )
        })?);
        let soundfont = Arc::new(
            SoundFont::new(&mut file)
                .map_err(|e| anyhow::anyhow!("Failed to load SoundFont: {:?}", e))?,
        );

        let (available_programs, instrument_names) = Self::scan_presets(&soundfont);

        let settings = SynthesizerSettings::new(SAMPLE_RATE as i32);
        let synth = Synthesizer::new(&soundfont, &settings)
            .map_err(|e| anyhow::anyhow!("Failed to create synthesizer: {:?}", e))?;
        let synth = Arc::new(Mutex::new(synth));

        let queue: EventQueue = Arc::new(Mutex::new(Vec::new()));
        let frames = Arc::new(AtomicU64::new(0));

        let (stream, stream_handle) =
            OutputStream::try_default().context("Failed to open audio output")?;

        let source = SynthSource::new(Arc::clone(&synth), Arc::clone(&queue), Arc::clone(&frames));
        stream_handle
            .play_raw(source)
            .context("Failed to start audio playback")?;

        Ok(Self {
            synth,
            queue,
            frames,
            _stream: stream,
            _stream_handle: stream_handle,
            next_channel: 0,
            available_programs,
            instrument_names,
        })
    }

    /// Scans the SoundFont's bank-0 presets for available programs and
    /// their names. Missing programs fall back to "Program N".
    fn scan_presets(soundfont: &SoundFont) -> ([bool; 128], [String; 128]) {
        let mut available = [false; 128];
        let mut names: [String; 128] = std::array::from_fn(|i| format!("Program {}", i));

        for preset in soundfont.get_presets() {
            let bank = preset.get_bank_number();
            let program = preset.get_patch_number();

            // Only bank 0 (General MIDI) feeds the main instrument list
            if bank == 0 && (0..128).contains(&program) {
                available[program as usize] = true;
                names[program as usize] = preset.get_name().to_string();
            }
        }

        (available, names)
    }

    /// Returns the instrument name for a given program number.
    pub fn instrument_name(&self, program: u8) -> &str {
        &self.instrument_names[(program as usize).min(127)]
    }

    /// Hands out the next free channel, skipping the drum channel and
    /// wrapping after 15 (channels may end up shared on large scores).
    fn allocate_channel(&mut self) -> u8 {
        let channel = self.next_channel;
        self.next_channel = if self.next_channel == 8 {
            10
        } else if self.next_channel >= 15 {
            0
        } else {
            self.next_channel + 1
        };
        channel
    }

    /// Loads a per-track instrument instance.
    ///
    /// Percussion tracks get the drum channel. A program the SoundFont
    /// does not map falls back to program 0 (the default melodic
    /// instrument) instead of failing.
    pub fn load_instrument(&mut self, instrument: &Instrument) -> SynthChannel {
        let channel = if instrument.percussion {
            DRUM_CHANNEL
        } else {
            self.allocate_channel()
        };

        let program = if instrument.number < 128 && self.available_programs[instrument.number as usize] {
            instrument.number
        } else {
            warn!(
                program = instrument.number,
                "program not in SoundFont, substituting default instrument"
            );
            0
        };

        if let Ok(mut synth) = self.synth.lock() {
            // Program change is MIDI command 0xC0
            synth.process_midi_message(channel as i32, 0xC0, program as i32, 0);
        }

        SynthChannel {
            channel,
            synth: Arc::clone(&self.synth),
            queue: Arc::clone(&self.queue),
        }
    }
}

impl AudioBackend for SoundFontBackend {
    type Instrument = SynthChannel;
    type Voice = SynthChannel;

    fn now(&self) -> f64 {
        self.frames.load(Ordering::Relaxed) as f64 / SAMPLE_RATE as f64
    }

    fn create_voice(&mut self) -> SynthChannel {
        SynthChannel {
            channel: self.allocate_channel(),
            synth: Arc::clone(&self.synth),
            queue: Arc::clone(&self.queue),
        }
    }
}
