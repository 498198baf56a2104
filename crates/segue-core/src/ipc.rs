use crate::playback_settings::PlaybackSettings;
use segue_ports::playback::PlaybackState;
use segue_ports::types::{InstrumentId, VoiceId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    Play,
    Pause,
    Resume,
    Stop,
    JumpToStep { step: usize },
    SetBpm { bpm: f64 },
    SetVoiceVolume { instrument: InstrumentId, voice: VoiceId, volume: f32 },
    SetMasterVolume { volume: f32 },
    LoadInstrument { name: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    StateChanged { state: PlaybackState },
    StepChanged { step: usize },
    TempoChanged { bpm: f64, whole_note_ms: f64 },
    VolumesUpdated { settings: PlaybackSettings },
}
