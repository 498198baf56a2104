use crate::clock::ClockAdapter;
use crate::ipc::{Command, Event};
use crate::playback_settings::{whole_note_duration_ms, PlaybackSettings};
use crate::scheduler::{DueStep, Scheduler, SchedulerConfig};
use crate::timers::TimerQueue;
use log::{debug, error, info, trace, warn};
use segue_ports::audio::AudioClockPort;
use segue_ports::playback::{PlaybackError, PlaybackState};
use segue_ports::score::{CursorPort, NoteRef, ScoreMeta};
use segue_ports::storage::{PlaybackConfig, StoragePort};
use segue_ports::synth::{InstrumentLoader, InstrumentPort, ScheduledNote};
use segue_ports::types::{InstrumentId, Tick, VoiceId, Volume01};
use std::collections::VecDeque;
use std::sync::Arc;

const DEFAULT_RHYTHMIC_DENOMINATOR: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeferredTask {
    CursorAdvance { tick: Tick },
}

struct LoadedScore {
    meta: ScoreMeta,
    cursor: Arc<dyn CursorPort>,
    scheduler: Scheduler,
    iteration_steps: usize,
}

/// Sounding duration of `note` in milliseconds.
///
/// The start of a tie carries the length of the following note as well;
/// the following note itself is silent.
pub fn note_duration_ms(note: &NoteRef, whole_note_ms: f64) -> f64 {
    let own = note.length.real_value() * whole_note_ms;
    match note.tie {
        None => own,
        Some(tie) if tie.start == note.id => match tie.following_length {
            Some(following) => own + following.real_value() * whole_note_ms,
            None => 0.0,
        },
        Some(_) => 0.0,
    }
}

pub struct PlaybackEngine {
    config: PlaybackConfig,
    clock: ClockAdapter,
    loader: Arc<dyn InstrumentLoader>,
    instrument: Option<Arc<dyn InstrumentPort>>,
    settings: PlaybackSettings,
    rhythmic_denominator: u32,
    score: Option<LoadedScore>,
    state: PlaybackState,
    current_step: usize,
    deferred: TimerQueue<DeferredTask>,
    events: VecDeque<Event>,
    storage: Option<Arc<dyn StoragePort>>,
}

impl PlaybackEngine {
    pub fn new(
        config: PlaybackConfig,
        clock: Arc<dyn AudioClockPort>,
        loader: Arc<dyn InstrumentLoader>,
    ) -> Self {
        clock.suspend();
        let settings = PlaybackSettings::new(config.default_bpm, config.tick_denominator);
        Self {
            config,
            clock: ClockAdapter::new(clock),
            loader,
            instrument: None,
            settings,
            rhythmic_denominator: DEFAULT_RHYTHMIC_DENOMINATOR,
            score: None,
            state: PlaybackState::Init,
            current_step: 0,
            deferred: TimerQueue::new(),
            events: VecDeque::new(),
            storage: None,
        }
    }

    /// Builds an engine from the stored config. A config that fails to load
    /// is replaced by the defaults.
    pub fn with_storage(
        storage: Arc<dyn StoragePort>,
        clock: Arc<dyn AudioClockPort>,
        loader: Arc<dyn InstrumentLoader>,
    ) -> Self {
        let config = storage.load_config().unwrap_or_else(|err| {
            warn!("config not loaded, using defaults: {}", err);
            PlaybackConfig::default()
        });
        let mut engine = Self::new(config, clock, loader);
        engine.storage = Some(storage);
        engine
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Writes the config back with the current tempo as the new default.
    pub fn save_config(&mut self) -> Result<(), PlaybackError> {
        self.config.default_bpm = self.settings.bpm;
        match self.storage.as_ref() {
            Some(storage) => {
                storage.save_config(&self.config)?;
                info!("config saved (default bpm {})", self.config.default_bpm);
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn iteration_steps(&self) -> usize {
        self.score
            .as_ref()
            .map(|score| score.iteration_steps)
            .unwrap_or(0)
    }

    pub fn bpm(&self) -> f64 {
        self.settings.bpm
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn score_meta(&self) -> Option<&ScoreMeta> {
        self.score.as_ref().map(|score| &score.meta)
    }

    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.score.as_ref().map(|score| &score.scheduler)
    }

    pub fn whole_note_duration_ms(&self) -> f64 {
        whole_note_duration_ms(self.settings.bpm, self.rhythmic_denominator)
    }

    pub fn loop_time_ms(&self) -> u64 {
        self.deferred.now_ms()
    }

    pub fn pending_cursor_advances(&self) -> usize {
        self.deferred.len()
    }

    pub fn load_instrument(&mut self, name: &str) -> Result<(), PlaybackError> {
        let instrument = self.loader.load_instrument(name)?;
        info!("instrument loaded: {}", name);
        self.instrument = Some(instrument);
        Ok(())
    }

    /// Walks the whole score once to build the step timeline.
    pub fn load_score(
        &mut self,
        meta: ScoreMeta,
        cursor: Arc<dyn CursorPort>,
    ) -> Result<(), PlaybackError> {
        if self.score.is_some() && self.state != PlaybackState::Init {
            self.stop()?;
        }
        self.deferred.clear();

        self.rhythmic_denominator = meta.rhythmic_denominator.max(1);
        if let Some(bpm) = meta.default_bpm {
            self.set_bpm(bpm)?;
        }
        self.settings.load_voices(&meta.instruments);

        let mut scheduler = Scheduler::new(
            SchedulerConfig::from(&self.config),
            self.whole_note_duration_ms(),
            self.clock.clone(),
        );

        cursor.reset();
        let mut iteration_steps = 0;
        while !cursor.end_reached() {
            let notes = cursor.current_notes();
            if !notes.is_empty() {
                scheduler.load_notes(&notes);
            }
            cursor.next();
            iteration_steps += 1;
        }
        cursor.reset();
        scheduler.sort_steps();

        info!(
            "score loaded: {} steps over {} cursor positions, whole note {}ms",
            scheduler.step_count(),
            iteration_steps,
            self.whole_note_duration_ms()
        );

        self.score = Some(LoadedScore {
            meta,
            cursor,
            scheduler,
            iteration_steps,
        });
        self.current_step = 0;
        self.set_state(PlaybackState::Init);
        self.events.push_back(Event::VolumesUpdated {
            settings: self.settings.clone(),
        });
        Ok(())
    }

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.score.is_none() {
            return Err(PlaybackError::NoScoreLoaded);
        }
        if self.state == PlaybackState::Playing {
            debug!("play ignored, already playing");
            return Ok(());
        }
        self.ensure_instrument()?;

        let loop_now = self.deferred.now_ms();
        if let Some(score) = self.score.as_ref() {
            score.cursor.show();
        }
        // clock resumes only once the cursor is up
        self.clock.resume();
        self.set_state(PlaybackState::Playing);
        let score = self.score.as_mut().ok_or(PlaybackError::NoScoreLoaded)?;
        score.scheduler.start(loop_now);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        let current_step = self.current_step;
        let score = self.score.as_mut().ok_or(PlaybackError::NoScoreLoaded)?;
        self.clock.suspend();
        if let Some(instrument) = self.instrument.as_ref() {
            instrument.stop();
        }
        score.scheduler.set_iteration_step(current_step);
        score.scheduler.pause();
        let cancelled = self.deferred.clear();
        if cancelled > 0 {
            debug!("cancelled {} pending cursor advances", cancelled);
        }
        self.set_state(PlaybackState::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.score.is_none() {
            return Err(PlaybackError::NoScoreLoaded);
        }
        if self.state != PlaybackState::Paused {
            debug!("resume ignored in state {:?}", self.state);
            return Ok(());
        }
        self.ensure_instrument()?;

        let loop_now = self.deferred.now_ms();
        let score = self.score.as_mut().ok_or(PlaybackError::NoScoreLoaded)?;
        if score.scheduler.is_running() {
            score.scheduler.resume();
        } else {
            // paused by a seek before playback ever started
            score.scheduler.start(loop_now);
        }
        self.clock.resume();
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), PlaybackError> {
        if self.state == PlaybackState::Init {
            debug!("stop ignored before playback started");
            return Ok(());
        }
        let score = self.score.as_mut().ok_or(PlaybackError::NoScoreLoaded)?;
        if let Some(instrument) = self.instrument.as_ref() {
            instrument.stop();
        }
        self.deferred.clear();
        score.scheduler.reset();
        score.cursor.reset();
        score.cursor.hide();
        self.current_step = 0;
        self.events.push_back(Event::StepChanged { step: 0 });
        self.set_state(PlaybackState::Stopped);
        Ok(())
    }

    /// Pauses, then walks the cursor to `target`.
    pub fn jump_to_step(&mut self, target: usize) -> Result<(), PlaybackError> {
        self.pause()?;
        let total = self.iteration_steps();
        let target = if target > total {
            warn!("jump target {} clamped to {}", target, total);
            total
        } else {
            target
        };
        debug!("jump to step {}", target);

        let score = self.score.as_mut().ok_or(PlaybackError::NoScoreLoaded)?;
        if self.current_step > target {
            score.cursor.hide();
            score.cursor.reset();
            self.current_step = 0;
        }
        while self.current_step < target {
            score.cursor.next();
            self.current_step += 1;
        }

        // the scheduler runs one step ahead of the cursor in steady state
        let mut scheduler_step = self.current_step;
        if self.current_step > 0 && self.current_step < total {
            scheduler_step += 1;
        }
        score.scheduler.set_iteration_step(scheduler_step);
        score.cursor.show();

        self.events.push_back(Event::StepChanged {
            step: self.current_step,
        });
        Ok(())
    }

    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), PlaybackError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(PlaybackError::InvalidTempo(bpm));
        }
        self.settings.bpm = bpm;
        let whole_note_ms = self.whole_note_duration_ms();
        if let Some(score) = self.score.as_mut() {
            score.scheduler.set_whole_note_duration(whole_note_ms);
        }
        debug!("bpm set to {} (whole note {}ms)", bpm, whole_note_ms);
        self.events.push_back(Event::TempoChanged { bpm, whole_note_ms });
        Ok(())
    }

    pub fn set_voice_volume(
        &mut self,
        instrument: InstrumentId,
        voice: VoiceId,
        volume: f32,
    ) -> Result<(), PlaybackError> {
        self.settings
            .set_voice_volume(instrument, voice, Volume01::new(volume))?;
        self.events.push_back(Event::VolumesUpdated {
            settings: self.settings.clone(),
        });
        Ok(())
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.settings.master_volume = Volume01::new(volume);
        self.events.push_back(Event::VolumesUpdated {
            settings: self.settings.clone(),
        });
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), PlaybackError> {
        match cmd {
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Stop => self.stop(),
            Command::JumpToStep { step } => self.jump_to_step(step),
            Command::SetBpm { bpm } => self.set_bpm(bpm),
            Command::SetVoiceVolume {
                instrument,
                voice,
                volume,
            } => self.set_voice_volume(instrument, voice, volume),
            Command::SetMasterVolume { volume } => {
                self.set_master_volume(volume);
                Ok(())
            }
            Command::LoadInstrument { name } => self.load_instrument(&name),
        }
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    /// Fires every scheduling pass and deferred cursor advance due at or
    /// before `loop_ms`, in due order.
    pub fn run_until(&mut self, loop_ms: u64) -> Result<(), PlaybackError> {
        loop {
            let pass_due = self
                .score
                .as_ref()
                .and_then(|score| score.scheduler.next_pass_due());
            let task_due = self.deferred.next_due();
            let (due, is_pass) = match (pass_due, task_due) {
                (Some(pass), Some(task)) if pass <= task => (pass, true),
                (Some(pass), None) => (pass, true),
                (_, Some(task)) => (task, false),
                (None, None) => break,
            };
            if due > loop_ms {
                break;
            }

            if is_pass {
                self.deferred.advance_to(due);
                let due_steps = match self.score.as_mut() {
                    Some(score) => score.scheduler.fire_pass(),
                    None => Vec::new(),
                };
                for step in due_steps {
                    self.on_step_due(step)?;
                }
            } else if let Some((_, task)) = self.deferred.pop_due(due) {
                match task {
                    DeferredTask::CursorAdvance { tick } => self.advance_cursor(tick),
                }
            }
        }
        self.deferred.advance_to(loop_ms);
        Ok(())
    }

    fn on_step_due(&mut self, step: DueStep) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Playing {
            trace!("step at tick {} dropped in state {:?}", step.tick, self.state);
            return Ok(());
        }

        let whole_note_ms = self.whole_note_duration_ms();
        let mut notes = Vec::with_capacity(step.notes.len());
        for note in &step.notes {
            let duration_ms = note_duration_ms(note, whole_note_ms);
            if duration_ms <= 0.0 {
                continue;
            }
            let Some(pitch) = note.pitch else {
                continue;
            };
            let gain = self
                .settings
                .gain(note.instrument, note.voice)
                .ok_or_else(|| {
                    error!(
                        "no volume entry for {} {} (note {:?})",
                        note.instrument, note.voice, note.id
                    );
                    PlaybackError::UnknownVoice {
                        instrument: note.instrument,
                        voice: note.voice,
                    }
                })?;
            notes.push(ScheduledNote {
                pitch,
                duration_seconds: duration_ms / 1000.0,
                gain,
            });
        }

        let instrument = self.instrument.as_ref().ok_or_else(|| {
            PlaybackError::Inconsistent("playing without an instrument".to_string())
        })?;
        if !notes.is_empty() {
            instrument.schedule(self.clock.current_time() + step.delay_seconds, &notes);
        }

        let lead_ms = self.config.cursor_lead_ms as f64;
        let advance_in_ms = (step.delay_seconds * 1000.0 - lead_ms).max(0.0).round() as u64;
        self.deferred
            .schedule_in(advance_in_ms, DeferredTask::CursorAdvance { tick: step.tick });
        Ok(())
    }

    fn advance_cursor(&mut self, tick: Tick) {
        if self.state != PlaybackState::Playing {
            warn!("stale cursor advance for tick {} ignored", tick);
            return;
        }
        let Some(score) = self.score.as_ref() else {
            return;
        };
        // the first position is already under the cursor after reset
        if self.current_step > 0 {
            score.cursor.next();
        }
        self.current_step += 1;
        trace!("cursor at step {} (tick {})", self.current_step, tick);
        self.events.push_back(Event::StepChanged {
            step: self.current_step,
        });
    }

    fn ensure_instrument(&mut self) -> Result<(), PlaybackError> {
        if self.instrument.is_none() {
            let name = self.config.default_instrument.clone();
            self.load_instrument(&name)?;
        }
        Ok(())
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        debug!("playback {:?} -> {:?}", self.state, state);
        self.state = state;
        self.events.push_back(Event::StateChanged { state });
    }
}
