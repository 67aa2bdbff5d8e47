//! Bounded history buffers used for smoothing and debouncing.

use std::collections::VecDeque;

/// Default number of frames kept in each history buffer.
pub const DEFAULT_HISTORY_LENGTH: usize = 30;

/// Fixed-capacity FIFO. Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> HistoryBuffer<T> {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, returning the evicted entry if the buffer was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(value);
        evicted
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

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.entries.iter()
    }
}

impl HistoryBuffer<bool> {
    /// Number of `true` entries.
    pub fn count_true(&self) -> usize {
        self.entries.iter().filter(|&&b| b).count()
    }
}
