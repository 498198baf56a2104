#![allow(dead_code)]

use parking_lot::Mutex;
use segue_core::{ManualClock, PlaybackEngine};
use segue_domain_score::{Score, ScoreCursor};
use segue_ports::score::NoteRef;
use segue_ports::storage::{PlaybackConfig, StorageError, StoragePort};
use segue_ports::synth::{InstrumentLoader, InstrumentPort, ScheduledNote, SynthError};
use segue_ports::types::{Fraction, InstrumentId, NoteId, VoiceId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn note(id: u64, pitch: u8) -> NoteRef {
    NoteRef {
        id: NoteId(id),
        pitch: Some(pitch),
        length: Fraction::new(1, 4),
        tie: None,
        instrument: InstrumentId(1),
        voice: VoiceId(1),
    }
}

#[derive(Default)]
pub struct RecordingInstrument {
    scheduled: Mutex<Vec<(f64, Vec<ScheduledNote>)>>,
    stops: AtomicUsize,
}

impl RecordingInstrument {
    pub fn scheduled(&self) -> Vec<(f64, Vec<ScheduledNote>)> {
        self.scheduled.lock().clone()
    }

    pub fn pitches(&self) -> Vec<u8> {
        self.scheduled
            .lock()
            .iter()
            .flat_map(|(_, notes)| notes.iter().map(|note| note.pitch))
            .collect()
    }

    /// Audio-clock start times of every scheduled batch, in whole milliseconds.
    pub fn onsets_ms(&self) -> Vec<u64> {
        self.scheduled
            .lock()
            .iter()
            .map(|(start, _)| (start * 1000.0).round() as u64)
            .collect()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.scheduled.lock().clear();
    }
}

impl InstrumentPort for RecordingInstrument {
    fn schedule(&self, start_time: f64, notes: &[ScheduledNote]) {
        self.scheduled.lock().push((start_time, notes.to_vec()));
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct RecordingLoader {
    pub instrument: Arc<RecordingInstrument>,
    requested: Mutex<Vec<String>>,
}

impl RecordingLoader {
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

impl InstrumentLoader for RecordingLoader {
    fn load_instrument(&self, name: &str) -> Result<Arc<dyn InstrumentPort>, SynthError> {
        if name.is_empty() {
            return Err(SynthError::InstrumentNotFound(name.to_string()));
        }
        self.requested.lock().push(name.to_string());
        Ok(self.instrument.clone() as Arc<dyn InstrumentPort>)
    }
}

/// Config store held in memory; `unreadable` makes every load fail.
#[derive(Default)]
pub struct MemoryStorage {
    pub saved: Mutex<Option<PlaybackConfig>>,
    pub unreadable: bool,
}

impl StoragePort for MemoryStorage {
    fn load_config(&self) -> Result<PlaybackConfig, StorageError> {
        if self.unreadable {
            return Err(StorageError::Io("unreadable".to_string()));
        }
        Ok(self.saved.lock().clone().unwrap_or_default())
    }

    fn save_config(&self, config: &PlaybackConfig) -> Result<(), StorageError> {
        *self.saved.lock() = Some(config.clone());
        Ok(())
    }
}

/// Engine wired to a manual clock; loop time and audio time move together.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub loader: Arc<RecordingLoader>,
    pub cursor: Arc<ScoreCursor>,
    pub engine: PlaybackEngine,
    pub now_ms: u64,
}

impl Harness {
    pub fn new(score: &Score) -> Self {
        Self::with_config(score, PlaybackConfig::default())
    }

    pub fn with_config(score: &Score, config: PlaybackConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let loader = Arc::new(RecordingLoader::default());
        let cursor = Arc::new(ScoreCursor::new(score));
        let mut engine = PlaybackEngine::new(config, clock.clone(), loader.clone());
        engine
            .load_score(score.meta.clone(), cursor.clone())
            .expect("load score");
        Self {
            clock,
            loader,
            cursor,
            engine,
            now_ms: 0,
        }
    }

    pub fn instrument(&self) -> &RecordingInstrument {
        &self.loader.instrument
    }

    pub fn advance(&mut self, ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(10);
            self.clock.advance_ms(step);
            self.now_ms += step;
            self.engine.run_until(self.now_ms).expect("run loop");
            remaining -= step;
        }
    }
}
