//! Recording backend for engine and player tests.
//!
//! Runs without an audio device: every scheduling call is appended to a
//! shared log that tests inspect after driving the engine.

use super::backend::{AudioBackend, SampleInstrument, ScheduledNote, Voice};
use std::cell::RefCell;
use std::rc::Rc;

/// Calls recorded against one mock instrument.
#[derive(Debug, Default)]
pub struct InstrumentLog {
    /// One entry per `schedule` call: (clock anchor, notes).
    pub schedules: Vec<(f64, Vec<ScheduledNote>)>,
    /// Number of `stop` calls.
    pub stops: usize,
    /// Every gain value applied, in order.
    pub gains: Vec<f32>,
}

/// Mock sampled instrument; the test keeps a handle to its log.
#[derive(Debug, Clone, Default)]
pub struct MockInstrument {
    pub log: Rc<RefCell<InstrumentLog>>,
}

impl MockInstrument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_gain(&self) -> Option<f32> {
        self.log.borrow().gains.last().copied()
    }
}

impl SampleInstrument for MockInstrument {
    fn schedule(&mut self, clock_sec: f64, notes: &[ScheduledNote]) {
        self.log
            .borrow_mut()
            .schedules
            .push((clock_sec, notes.to_vec()));
    }

    fn stop(&mut self) {
        self.log.borrow_mut().stops += 1;
    }

    fn set_gain(&mut self, gain: f32) {
        self.log.borrow_mut().gains.push(gain);
    }
}

/// One `trigger_attack_release` call on a mock voice.
#[derive(Debug, Clone, PartialEq)]
pub struct Triggered {
    pub voice: usize,
    pub name: String,
    pub duration_sec: f64,
    pub clock_sec: f64,
    pub velocity: f32,
}

/// Shared log of voice activity across a whole backend.
#[derive(Debug, Default)]
pub struct VoiceLog {
    pub created: usize,
    pub disposed: usize,
    pub triggered: Vec<Triggered>,
}

/// Mock synthesizer voice.
pub struct MockVoice {
    id: usize,
    log: Rc<RefCell<VoiceLog>>,
}

impl Voice for MockVoice {
    fn trigger_attack_release(
        &mut self,
        name: &str,
        duration_sec: f64,
        clock_sec: f64,
        velocity: f32,
    ) {
        self.log.borrow_mut().triggered.push(Triggered {
            voice: self.id,
            name: name.to_string(),
            duration_sec,
            clock_sec,
            velocity,
        });
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed += 1;
    }
}

/// Mock backend with a settable clock.
#[derive(Default)]
pub struct MockBackend {
    pub clock_sec: f64,
    pub voice_log: Rc<RefCell<VoiceLog>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(clock_sec: f64) -> Self {
        Self {
            clock_sec,
            ..Self::default()
        }
    }
}

impl AudioBackend for MockBackend {
    type Instrument = MockInstrument;
    type Voice = MockVoice;

    fn now(&self) -> f64 {
        self.clock_sec
    }

    fn create_voice(&mut self) -> MockVoice {
        let mut log = self.voice_log.borrow_mut();
        log.created += 1;
        let id = log.created - 1;
        drop(log);
        MockVoice {
            id,
            log: Rc::clone(&self.voice_log),
        }
    }
}
