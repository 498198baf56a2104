use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// One-shot deferred tasks on the loop clock (milliseconds).
///
/// Tasks fire in `(due, id)` order. `clear` cancels everything pending.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now_ms: u64,
    next_id: u64,
    pending: BTreeMap<(u64, TimerId), T>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule_in(&mut self, delay_ms: u64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.pending.insert((due, id), task);
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self.pending.keys().find(|(_, key_id)| *key_id == id).copied()?;
        self.pending.remove(&key)
    }

    /// Cancels every pending task, returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let (&(due, id), _) = self.pending.first_key_value()?;
        if due > until_ms {
            return None;
        }
        let task = self.pending.remove(&(due, id))?;
        self.advance_to(due);
        Some((id, task))
    }

    pub fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic trigger on the loop clock.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
    period_ms: u64,
    next_due_ms: Option<u64>,
}

impl Interval {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due_ms: None,
        }
    }

    /// Returns false when already armed.
    pub fn arm(&mut self, now_ms: u64) -> bool {
        if self.next_due_ms.is_some() {
            return false;
        }
        self.next_due_ms = Some(now_ms.saturating_add(self.period_ms));
        true
    }

    pub fn disarm(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.next_due_ms
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Consumes the pending firing and schedules the following one.
    pub fn fire(&mut self) -> Option<u64> {
        let due = self.next_due_ms?;
        self.next_due_ms = Some(due.saturating_add(self.period_ms));
        Some(due)
    }
}
