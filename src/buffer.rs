// Bounded FIFO history window shared by the usage and network-speed charts.

use std::collections::VecDeque;
use std::collections::vec_deque::Iter;

/// Samples kept per chart: 20 from before plus the newest.
pub const WINDOW_CAPACITY: usize = 21;

/// Fixed-capacity window; appending to a full window evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> Default for SampleBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SampleBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }

    /// A zero capacity is bumped to 1 so the newest sample is always retained.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, sample: T) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Retained samples, oldest first. The iterator is `Clone`, so it can be walked again.
    pub fn iter(&self) -> Iter<'_, T> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<'a, T> IntoIterator for &'a SampleBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
