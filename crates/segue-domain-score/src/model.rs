use segue_ports::score::{InstrumentInfo, NoteRef, ScoreMeta, TieRef};
use segue_ports::types::{Fraction, InstrumentId, NoteId, VoiceId};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ScoreError {
    #[error("rhythmic denominator must be positive")]
    InvalidDenominator,
    #[error("note {0:?} not found")]
    NoteNotFound(NoteId),
    #[error("note {0:?} is already tied")]
    AlreadyTied(NoteId),
    #[error("note {note:?} uses undeclared {instrument} {voice}")]
    UndeclaredVoice {
        note: NoteId,
        instrument: InstrumentId,
        voice: VoiceId,
    },
}

/// Notes that start together at one cursor position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceEntryGroup {
    pub notes: Vec<NoteRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub meta: ScoreMeta,
    pub groups: Vec<VoiceEntryGroup>,
}

impl Score {
    pub fn note_count(&self) -> usize {
        self.groups.iter().map(|group| group.notes.len()).sum()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct NoteSpec {
    pub pitch: Option<u8>,
    pub length: Fraction,
    pub instrument: InstrumentId,
    pub voice: VoiceId,
}

impl NoteSpec {
    pub fn note(pitch: u8, length: Fraction, instrument: InstrumentId, voice: VoiceId) -> Self {
        Self {
            pitch: Some(pitch),
            length,
            instrument,
            voice,
        }
    }

    pub fn rest(length: Fraction, instrument: InstrumentId, voice: VoiceId) -> Self {
        Self {
            pitch: None,
            length,
            instrument,
            voice,
        }
    }
}

pub struct ScoreBuilder {
    meta: ScoreMeta,
    groups: Vec<VoiceEntryGroup>,
    next_note_id: u64,
}

impl ScoreBuilder {
    pub fn new(rhythmic_denominator: u32) -> Self {
        Self {
            meta: ScoreMeta {
                title: None,
                rhythmic_denominator,
                default_bpm: None,
                instruments: Vec::new(),
            },
            groups: Vec::new(),
            next_note_id: 0,
        }
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.meta.title = Some(title.into());
        self
    }

    pub fn default_bpm(&mut self, bpm: f64) -> &mut Self {
        self.meta.default_bpm = Some(bpm);
        self
    }

    pub fn instrument(&mut self, id: InstrumentId, name: &str, voices: &[VoiceId]) -> &mut Self {
        self.meta.instruments.push(InstrumentInfo {
            id,
            name: name.to_string(),
            voices: voices.to_vec(),
        });
        self
    }

    /// Appends one cursor position and returns the ids of its notes.
    pub fn group(&mut self, specs: &[NoteSpec]) -> Vec<NoteId> {
        let mut group = VoiceEntryGroup::default();
        let mut ids = Vec::with_capacity(specs.len());
        for spec in specs {
            let id = NoteId(self.next_note_id);
            self.next_note_id += 1;
            group.notes.push(NoteRef {
                id,
                pitch: spec.pitch,
                length: spec.length,
                tie: None,
                instrument: spec.instrument,
                voice: spec.voice,
            });
            ids.push(id);
        }
        self.groups.push(group);
        ids
    }

    pub fn tie(&mut self, start: NoteId, next: NoteId) -> Result<(), ScoreError> {
        let following_length = self.note(next)?.length;
        for id in [start, next] {
            if self.note(id)?.tie.is_some() {
                return Err(ScoreError::AlreadyTied(id));
            }
        }

        let tie = TieRef {
            start,
            following_length: Some(following_length),
        };
        for id in [start, next] {
            if let Some(note) = self.note_mut(id) {
                note.tie = Some(tie);
            }
        }
        Ok(())
    }

    pub fn build(self) -> Result<Score, ScoreError> {
        if self.meta.rhythmic_denominator == 0 {
            return Err(ScoreError::InvalidDenominator);
        }

        for note in self.groups.iter().flat_map(|group| group.notes.iter()) {
            let declared = self
                .meta
                .instruments
                .iter()
                .find(|instrument| instrument.id == note.instrument)
                .map(|instrument| instrument.voices.contains(&note.voice))
                .unwrap_or(false);
            if !declared {
                return Err(ScoreError::UndeclaredVoice {
                    note: note.id,
                    instrument: note.instrument,
                    voice: note.voice,
                });
            }
        }

        Ok(Score {
            meta: self.meta,
            groups: self.groups,
        })
    }

    fn note(&self, id: NoteId) -> Result<&NoteRef, ScoreError> {
        self.groups
            .iter()
            .flat_map(|group| group.notes.iter())
            .find(|note| note.id == id)
            .ok_or(ScoreError::NoteNotFound(id))
    }

    fn note_mut(&mut self, id: NoteId) -> Option<&mut NoteRef> {
        self.groups
            .iter_mut()
            .flat_map(|group| group.notes.iter_mut())
            .find(|note| note.id == id)
    }
}
