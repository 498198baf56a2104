use segue_ports::playback::PlaybackError;
use segue_ports::score::InstrumentInfo;
use segue_ports::types::{InstrumentId, VoiceId, Volume01};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoiceVolume {
    pub id: VoiceId,
    pub name: String,
    pub volume: Volume01,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentVolumes {
    pub id: InstrumentId,
    pub name: String,
    pub voices: Vec<VoiceVolume>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    pub bpm: f64,
    pub tick_denominator: u32,
    pub master_volume: Volume01,
    pub instruments: Vec<InstrumentVolumes>,
}

impl PlaybackSettings {
    pub fn new(bpm: f64, tick_denominator: u32) -> Self {
        Self {
            bpm,
            tick_denominator,
            master_volume: Volume01::new(1.0),
            instruments: Vec::new(),
        }
    }

    /// Rebuilds the volume table from a score's instrument list, all at full volume.
    pub fn load_voices(&mut self, instruments: &[InstrumentInfo]) {
        self.instruments = instruments
            .iter()
            .map(|instrument| InstrumentVolumes {
                id: instrument.id,
                name: instrument.name.clone(),
                voices: instrument
                    .voices
                    .iter()
                    .map(|voice| VoiceVolume {
                        id: *voice,
                        name: format!("Voice {}", voice.0),
                        volume: Volume01::new(1.0),
                    })
                    .collect(),
            })
            .collect();
    }

    pub fn voice_volume(&self, instrument: InstrumentId, voice: VoiceId) -> Option<Volume01> {
        self.instruments
            .iter()
            .find(|entry| entry.id == instrument)?
            .voices
            .iter()
            .find(|entry| entry.id == voice)
            .map(|entry| entry.volume)
    }

    pub fn set_voice_volume(
        &mut self,
        instrument: InstrumentId,
        voice: VoiceId,
        volume: Volume01,
    ) -> Result<(), PlaybackError> {
        let entry = self
            .instruments
            .iter_mut()
            .find(|entry| entry.id == instrument)
            .and_then(|entry| entry.voices.iter_mut().find(|entry| entry.id == voice))
            .ok_or(PlaybackError::UnknownVoice { instrument, voice })?;
        entry.volume = volume;
        Ok(())
    }

    pub fn gain(&self, instrument: InstrumentId, voice: VoiceId) -> Option<f32> {
        self.voice_volume(instrument, voice)
            .map(|volume| volume.get() * self.master_volume.get())
    }
}

/// Length of a whole note in milliseconds at `bpm`, rounded.
pub fn whole_note_duration_ms(bpm: f64, rhythmic_denominator: u32) -> f64 {
    (60.0 / bpm * rhythmic_denominator as f64 * 1000.0).round()
}
