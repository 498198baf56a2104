use crate::types::*;
use serde::{Deserialize, Serialize};

/// Tie relation as seen from one of the tied notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieRef {
    pub start: NoteId,
    /// Length of the note following the start note, if the tie has one.
    pub following_length: Option<Fraction>,
}

/// Handle to a note of the external score model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteRef {
    pub id: NoteId,
    /// Half-tone pitch, `None` for rests.
    pub pitch: Option<u8>,
    pub length: Fraction,
    pub tie: Option<TieRef>,
    pub instrument: InstrumentId,
    pub voice: VoiceId,
}

impl NoteRef {
    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }

    pub fn starts_tie(&self) -> bool {
        self.tie.map(|tie| tie.start == self.id).unwrap_or(false)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub id: InstrumentId,
    pub name: String,
    pub voices: Vec<VoiceId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreMeta {
    pub title: Option<String>,
    /// Base rhythmic unit of the score (time signature denominator).
    pub rhythmic_denominator: u32,
    pub default_bpm: Option<f64>,
    pub instruments: Vec<InstrumentInfo>,
}

/// Sequential walk over voice-entry groups plus the visual cursor it drives.
///
/// Thread model: called from the single playback actor only. There is no
/// random access, seeking is `reset` followed by repeated `next`.
pub trait CursorPort: Send + Sync {
    fn reset(&self);
    fn next(&self);
    fn end_reached(&self) -> bool;

    /// Notes starting at the current position, empty past the end.
    fn current_notes(&self) -> Vec<NoteRef>;

    fn show(&self);
    fn hide(&self);
}
