use crate::storage::StorageError;
use crate::synth::SynthError;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Init,
    Playing,
    Paused,
    Stopped,
}

#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    #[error("no score loaded")]
    NoScoreLoaded,
    #[error("invalid tempo: {0} bpm")]
    InvalidTempo(f64),
    #[error("unknown voice: {instrument} {voice}")]
    UnknownVoice {
        instrument: InstrumentId,
        voice: VoiceId,
    },
    #[error("internal inconsistency: {0}")]
    Inconsistent(String),
    #[error("synth error: {0}")]
    Synth(#[from] SynthError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
