use std::collections::VecDeque;

/// Bounded trace log shown to status readers
///
/// Keeps the most recent `capacity` messages in arrival order; older entries are
/// dropped from the front.
#[derive(Debug, Clone)]
pub struct DebugLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl DebugLog {
    /// Creates an empty log holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a message, evicting the oldest one when full
    pub fn push(&mut self, message: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
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

    /// Copies the entries out, oldest first
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
