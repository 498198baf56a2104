use crate::model::{Score, VoiceEntryGroup};
use parking_lot::Mutex;
use segue_ports::score::{CursorPort, NoteRef};

#[derive(Debug)]
struct CursorState {
    position: usize,
    visible: bool,
}

/// Cursor over the groups of an in-memory [`Score`].
pub struct ScoreCursor {
    groups: Vec<VoiceEntryGroup>,
    state: Mutex<CursorState>,
}

impl ScoreCursor {
    pub fn new(score: &Score) -> Self {
        Self {
            groups: score.groups.clone(),
            state: Mutex::new(CursorState {
                position: 0,
                visible: false,
            }),
        }
    }

    pub fn position(&self) -> usize {
        self.state.lock().position
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl CursorPort for ScoreCursor {
    fn reset(&self) {
        self.state.lock().position = 0;
    }

    fn next(&self) {
        let mut state = self.state.lock();
        if state.position < self.groups.len() {
            state.position += 1;
        }
    }

    fn end_reached(&self) -> bool {
        self.state.lock().position >= self.groups.len()
    }

    fn current_notes(&self) -> Vec<NoteRef> {
        let position = self.state.lock().position;
        self.groups
            .get(position)
            .map(|group| group.notes.clone())
            .unwrap_or_default()
    }

    fn show(&self) {
        self.state.lock().visible = true;
    }

    fn hide(&self) {
        self.state.lock().visible = false;
    }
}
