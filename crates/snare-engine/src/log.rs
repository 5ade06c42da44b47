use std::collections::VecDeque;

use crate::outcome::ExecutionOutcome;

/// How many outcomes a log retains unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

/// Bounded record of execution outcomes, newest first.
///
/// Outcomes normally arrive in timestamp order, but a slow periodic
/// cycle can land after a faster manual run; insertion keeps the log
/// sorted either way. When the bound is exceeded the oldest entries
/// are dropped.
#[derive(Debug)]
pub struct ObservationLog {
    entries: VecDeque<ExecutionOutcome>,
    capacity: usize,
}

impl ObservationLog {
    /// A capacity below 1 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn append(&mut self, outcome: ExecutionOutcome) {
        let at = self
            .entries
            .iter()
            .take_while(|entry| entry.timestamp > outcome.timestamp)
            .count();
        self.entries.insert(at, outcome);
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &ExecutionOutcome> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ExecutionOutcome> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for ObservationLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
