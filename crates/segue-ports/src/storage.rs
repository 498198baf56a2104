use serde::{Deserialize, Serialize};

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_lookahead_window_ms() -> u64 {
    1500
}

fn default_tick_denominator() -> u32 {
    1024
}

fn default_bpm() -> f64 {
    100.0
}

fn default_cursor_lead_ms() -> u64 {
    40
}

fn default_instrument() -> String {
    "acoustic_grand_piano".to_string()
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_lookahead_window_ms")]
    pub lookahead_window_ms: u64,
    #[serde(default = "default_tick_denominator")]
    pub tick_denominator: u32,
    #[serde(default = "default_bpm")]
    pub default_bpm: f64,
    /// Visual cursor moves this much ahead of the audible onset.
    #[serde(default = "default_cursor_lead_ms")]
    pub cursor_lead_ms: u64,
    #[serde(default = "default_instrument")]
    pub default_instrument: String,
    pub lead_in_ticks: i64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            lookahead_window_ms: default_lookahead_window_ms(),
            tick_denominator: default_tick_denominator(),
            default_bpm: default_bpm(),
            cursor_lead_ms: default_cursor_lead_ms(),
            default_instrument: default_instrument(),
            lead_in_ticks: 0,
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_config(&self) -> Result<PlaybackConfig, StorageError>;
    fn save_config(&self, config: &PlaybackConfig) -> Result<(), StorageError>;
}
