use crate::clock::ClockAdapter;
use crate::step_queue::{Step, StepQueue};
use crate::timers::Interval;
use log::{debug, trace};
use segue_ports::score::NoteRef;
use segue_ports::storage::PlaybackConfig;
use segue_ports::types::Tick;
use std::collections::{BTreeSet, VecDeque};

#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    pub poll_interval_ms: u64,
    pub lookahead_ms: u64,
    pub tick_denominator: u32,
    pub lead_in_ticks: Tick,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for SchedulerConfig {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            poll_interval_ms: config.poll_interval_ms,
            lookahead_ms: config.lookahead_window_ms,
            tick_denominator: config.tick_denominator.max(1),
            lead_in_ticks: config.lead_in_ticks,
        }
    }
}

/// A step handed to the note callback, `delay_seconds` ahead of now.
#[derive(Clone, Debug, PartialEq)]
pub struct DueStep {
    pub tick: Tick,
    pub delay_seconds: f64,
    pub notes: Vec<NoteRef>,
}

pub struct Scheduler {
    config: SchedulerConfig,
    clock: ClockAdapter,
    steps: StepQueue,
    lookahead_index: usize,
    scheduled_ticks: VecDeque<Tick>,
    // fractional so per-pass re-anchoring does not drift
    current_tick: f64,
    current_tick_timestamp: f64,
    whole_note_ms: f64,
    interval: Interval,
    playing: bool,
    future_ticks: BTreeSet<Tick>,
    last_loaded_tick: Option<Tick>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, whole_note_ms: f64, clock: ClockAdapter) -> Self {
        Self {
            config,
            clock,
            steps: StepQueue::new(),
            lookahead_index: 0,
            scheduled_ticks: VecDeque::new(),
            current_tick: 0.0,
            current_tick_timestamp: 0.0,
            whole_note_ms,
            interval: Interval::new(config.poll_interval_ms),
            playing: false,
            future_ticks: BTreeSet::new(),
            last_loaded_tick: None,
        }
    }

    /// Places the notes of one cursor position on the tick timeline.
    ///
    /// A position starts where the earliest still-sounding note ends, so
    /// interleaved voices land on their true metrical tick.
    pub fn load_notes(&mut self, notes: &[NoteRef]) -> Tick {
        let this_tick = if self.steps.is_empty() {
            self.config.lead_in_ticks
        } else {
            self.future_ticks
                .first()
                .copied()
                .or(self.last_loaded_tick)
                .unwrap_or(self.config.lead_in_ticks)
        };

        for note in notes {
            let end_tick =
                this_tick.saturating_add(note.length.to_ticks(self.config.tick_denominator));
            self.future_ticks.insert(end_tick);
            self.steps.add(this_tick, note.clone());
        }

        self.future_ticks.retain(|tick| *tick > this_tick);
        self.last_loaded_tick = Some(this_tick);
        this_tick
    }

    pub fn insert_note(&mut self, tick: Tick, note: NoteRef) {
        self.steps.add(tick, note);
    }

    pub fn sort_steps(&mut self) {
        self.steps.sort();
    }

    pub fn steps(&self) -> &StepQueue {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn tick_duration_ms(&self) -> f64 {
        self.whole_note_ms / self.config.tick_denominator as f64
    }

    pub fn lookahead_window_ticks(&self) -> f64 {
        self.config.lookahead_ms as f64 / self.tick_duration_ms()
    }

    pub fn whole_note_duration_ms(&self) -> f64 {
        self.whole_note_ms
    }

    /// Tempo change. Ticks stay put, only their wall-clock mapping moves.
    pub fn set_whole_note_duration(&mut self, whole_note_ms: f64) {
        if self.playing {
            let now = self.clock.elapsed_ms();
            self.current_tick = self.calculated_tick(now);
            self.current_tick_timestamp = now;
        }
        self.whole_note_ms = whole_note_ms;
        debug!(
            "tempo changed: whole note {}ms, tick {:.3}ms",
            whole_note_ms,
            self.tick_duration_ms()
        );
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick.round() as Tick
    }

    pub fn lookahead_index(&self) -> usize {
        self.lookahead_index
    }

    pub fn scheduled_ticks(&self) -> Vec<Tick> {
        self.scheduled_ticks.iter().copied().collect()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_armed()
    }

    /// Begins periodic passes. A no-op while already playing.
    pub fn start(&mut self, loop_now_ms: u64) {
        if self.playing && self.interval.is_armed() {
            debug!("scheduler already running");
            return;
        }
        self.steps.sort();
        self.clock.reset_origin();
        self.current_tick_timestamp = self.clock.elapsed_ms();
        self.playing = true;
        if self.interval.arm(loop_now_ms) {
            debug!(
                "scheduler started: {} steps, tick {:.3}ms",
                self.steps.len(),
                self.tick_duration_ms()
            );
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        self.playing = true;
        self.current_tick_timestamp = self.clock.elapsed_ms();
    }

    pub fn reset(&mut self) {
        self.playing = false;
        self.current_tick = 0.0;
        self.current_tick_timestamp = 0.0;
        self.lookahead_index = 0;
        self.scheduled_ticks.clear();
        self.interval.disarm();
    }

    /// Seeks to a step index, clamped to the last step. Call while paused.
    pub fn set_iteration_step(&mut self, step: usize) {
        if self.steps.is_empty() {
            return;
        }
        let index = step.min(self.steps.len() - 1);
        if let Some(target) = self.steps.get(index) {
            self.current_tick = target.tick as f64;
        }
        self.lookahead_index = index;
        self.scheduled_ticks.clear();
        debug!("scheduler seek: step {} tick {}", index, self.current_tick);
    }

    pub fn next_pass_due(&self) -> Option<u64> {
        self.interval.next_due()
    }

    /// Consumes one periodic firing and runs its pass.
    pub fn fire_pass(&mut self) -> Vec<DueStep> {
        if self.interval.fire().is_none() {
            return Vec::new();
        }
        self.schedule_pass()
    }

    /// Runs every periodic pass due at or before `loop_ms`.
    pub fn run_until(&mut self, loop_ms: u64) -> Vec<DueStep> {
        let mut due = Vec::new();
        while let Some(next) = self.interval.next_due() {
            if next > loop_ms {
                break;
            }
            due.extend(self.fire_pass());
        }
        due
    }

    pub fn schedule_pass(&mut self) -> Vec<DueStep> {
        if !self.playing {
            return Vec::new();
        }

        let now = self.clock.elapsed_ms();
        self.current_tick = self.calculated_tick(now);
        self.current_tick_timestamp = now;

        let tick_ms = self.tick_duration_ms();
        let window_ms = self.config.lookahead_ms as f64;
        let mut due = Vec::new();
        while let Some(step) = self.steps.get(self.lookahead_index) {
            let offset_ms = (step.tick as f64 - self.current_tick) * tick_ms;
            if offset_ms > window_ms {
                break;
            }

            let delay_ms = offset_ms.max(0.0);
            trace!("dispatch tick {} in {:.1}ms", step.tick, delay_ms);
            self.scheduled_ticks.push_back(step.tick);
            due.push(DueStep {
                tick: step.tick,
                delay_seconds: delay_ms / 1000.0,
                notes: step.notes.clone(),
            });
            self.lookahead_index += 1;
        }

        while let Some(&tick) = self.scheduled_ticks.front() {
            if tick as f64 > self.current_tick {
                break;
            }
            self.scheduled_ticks.pop_front();
        }

        due
    }

    fn calculated_tick(&self, now_ms: f64) -> f64 {
        let tick_ms = self.tick_duration_ms();
        if tick_ms <= 0.0 {
            return self.current_tick;
        }
        self.current_tick + (now_ms - self.current_tick_timestamp) / tick_ms
    }
}
