use parking_lot::Mutex;
use segue_ports::audio::AudioClockPort;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Elapsed milliseconds on an audio clock, measured from a movable origin.
#[derive(Clone)]
pub struct ClockAdapter {
    clock: Arc<dyn AudioClockPort>,
    origin_seconds: f64,
}

impl ClockAdapter {
    pub fn new(clock: Arc<dyn AudioClockPort>) -> Self {
        Self {
            clock,
            origin_seconds: 0.0,
        }
    }

    pub fn reset_origin(&mut self) {
        self.origin_seconds = self.clock.current_time();
    }

    pub fn elapsed_ms(&self) -> f64 {
        (self.clock.current_time() - self.origin_seconds) * 1000.0
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn suspend(&self) {
        self.clock.suspend();
    }

    pub fn resume(&self) {
        self.clock.resume();
    }
}

#[derive(Debug)]
struct ManualState {
    micros: u64,
    suspended: bool,
}

/// Clock moved by hand. Advancing while suspended has no effect.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManualState {
                micros: 0,
                suspended: false,
            }),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        let mut state = self.state.lock();
        if !state.suspended {
            state.micros = state.micros.saturating_add(ms.saturating_mul(1000));
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().suspended
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClockPort for ManualClock {
    fn current_time(&self) -> f64 {
        self.state.lock().micros as f64 / 1_000_000.0
    }

    fn suspend(&self) {
        self.state.lock().suspended = true;
    }

    fn resume(&self) {
        self.state.lock().suspended = false;
    }
}

#[derive(Debug)]
struct SystemState {
    accumulated: Duration,
    running_since: Option<Instant>,
}

/// Wall-clock backed audio clock that only counts time while running.
#[derive(Debug)]
pub struct SystemClock {
    state: Mutex<SystemState>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SystemState {
                accumulated: Duration::ZERO,
                running_since: Some(Instant::now()),
            }),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClockPort for SystemClock {
    fn current_time(&self) -> f64 {
        let state = self.state.lock();
        let running = state
            .running_since
            .map(|since| since.elapsed())
            .unwrap_or_default();
        (state.accumulated + running).as_secs_f64()
    }

    fn suspend(&self) {
        let mut state = self.state.lock();
        if let Some(since) = state.running_since.take() {
            state.accumulated += since.elapsed();
        }
    }

    fn resume(&self) {
        let mut state = self.state.lock();
        if state.running_since.is_none() {
            state.running_since = Some(Instant::now());
        }
    }
}
