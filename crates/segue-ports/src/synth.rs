use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    #[error("instrument not found: {0}")]
    InstrumentNotFound(String),
    #[error("instrument load failed: {0}")]
    Load(String),
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNote {
    pub pitch: u8,
    pub duration_seconds: f64,
    pub gain: f32,
}

/// Fire-and-forget note sink. `schedule` times are on the audio clock.
pub trait InstrumentPort: Send + Sync {
    fn schedule(&self, start_time: f64, notes: &[ScheduledNote]);

    /// Silence every sounding and pending note immediately.
    fn stop(&self);
}

pub trait InstrumentLoader: Send + Sync {
    fn load_instrument(&self, name: &str) -> Result<Arc<dyn InstrumentPort>, SynthError>;
}
