//! Fixed-capacity experience replay.

use std::collections::VecDeque;

use rand::Rng;

use crate::policy::Experience;

/// Circular store of past transitions.
///
/// Once full, pushing a new experience evicts the oldest. Owned exclusively
/// by one agent instance; sampling draws **unique** indices, so a batch
/// never contains the same stored transition twice.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Experience>,
    capacity: usize,
}

impl ReplayBuffer {
    /// Creates a buffer holding at most `capacity` experiences.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an experience, evicting the oldest when full.
    pub fn push(&mut self, experience: Experience) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(experience);
    }

    /// Samples up to `batch_size` distinct experiences uniformly at random.
    pub fn sample<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Vec<&Experience> {
        let amount = batch_size.min(self.buffer.len());
        rand::seq::index::sample(rng, self.buffer.len(), amount)
            .iter()
            .map(|i| &self.buffer[i])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all stored experiences.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    #[cfg(test)]
    fn oldest(&self) -> Option<&Experience> {
        self.buffer.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Action, State};
    use crate::random::create_rng;

    fn tagged_experience(tag: f64) -> Experience {
        Experience::new(
            State::new(vec![tag]),
            Action::index(0),
            tag,
            State::new(vec![tag + 1.0]),
            false,
        )
    }

    #[test]
    fn test_push_and_len() {
        let mut buffer = ReplayBuffer::new(10);
        assert!(buffer.is_empty());
        buffer.push(tagged_experience(1.0));
        assert_eq!(buffer.len(), 1);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_capacity_plus_one_evicts_oldest() {
        let capacity = 5;
        let mut buffer = ReplayBuffer::new(capacity);
        for i in 0..=capacity {
            buffer.push(tagged_experience(i as f64));
        }
        assert_eq!(buffer.len(), capacity);
        // Experience 0 was evicted; 1 is now the oldest.
        assert_eq!(buffer.oldest().unwrap().reward, 1.0);
    }

    #[test]
    fn test_sample_indices_are_unique() {
        let mut buffer = ReplayBuffer::new(100);
        for i in 0..50 {
            buffer.push(tagged_experience(i as f64));
        }
        let mut rng = create_rng(42);
        for _ in 0..20 {
            let batch = buffer.sample(32, &mut rng);
            assert_eq!(batch.len(), 32);
            let mut tags: Vec<f64> = batch.iter().map(|e| e.reward).collect();
            tags.sort_by(|a, b| a.partial_cmp(b).unwrap());
            tags.dedup();
            assert_eq!(tags.len(), 32, "batch contained duplicate experiences");
        }
    }

    #[test]
    fn test_sample_caps_at_buffer_len() {
        let mut buffer = ReplayBuffer::new(100);
        for i in 0..3 {
            buffer.push(tagged_experience(i as f64));
        }
        let mut rng = create_rng(1);
        assert_eq!(buffer.sample(10, &mut rng).len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut buffer = ReplayBuffer::new(4);
        buffer.push(tagged_experience(0.0));
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    #[should_panic(expected = "replay capacity must be positive")]
    fn test_zero_capacity_panics() {
        ReplayBuffer::new(0);
    }
}
