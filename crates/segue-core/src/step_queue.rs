use segue_ports::score::NoteRef;
use segue_ports::types::Tick;

/// Notes that start sounding at one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub tick: Tick,
    pub notes: Vec<NoteRef>,
}

/// Steps keyed by tick. At most one step exists per tick.
#[derive(Clone, Debug, Default)]
pub struct StepQueue {
    steps: Vec<Step>,
}

impl StepQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tick: Tick, note: NoteRef) {
        match self.steps.iter_mut().find(|step| step.tick == tick) {
            Some(step) => step.notes.push(note),
            None => self.steps.push(Step {
                tick,
                notes: vec![note],
            }),
        }
    }

    pub fn remove(&mut self, tick: Tick) -> Option<Step> {
        let index = self.steps.iter().position(|step| step.tick == tick)?;
        Some(self.steps.remove(index))
    }

    /// Stable, so equal ticks keep insertion order.
    pub fn sort(&mut self) {
        self.steps.sort_by_key(|step| step.tick);
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

impl<'a> IntoIterator for &'a StepQueue {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
