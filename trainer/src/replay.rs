//! Bounded FIFO experience buffer.
//!
//! Holds the most recent self-play examples. Pushing past capacity evicts the
//! oldest entries first. Training reads the buffer as shuffled mini-batches.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use mcts::Experience;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Errors from the experience buffer.
#[derive(Debug, Error, PartialEq)]
pub enum ReplayError {
    #[error("Buffer capacity must be greater than 0")]
    ZeroCapacity,

    #[error("Batch size must be greater than 0")]
    ZeroBatchSize,

    #[error("Experience buffer lock poisoned")]
    Poisoned,
}

/// FIFO store of training examples with a fixed capacity.
#[derive(Debug, Clone)]
pub struct ExperienceBuffer {
    capacity: usize,
    data: VecDeque<Experience>,
}

impl ExperienceBuffer {
    pub fn new(capacity: usize) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            data: VecDeque::with_capacity(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one example, evicting the oldest when full.
    pub fn push(&mut self, example: Experience) {
        if self.data.len() == self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(example);
    }

    /// Append many examples in order.
    pub fn extend<I: IntoIterator<Item = Experience>>(&mut self, examples: I) {
        for example in examples {
            self.push(example);
        }
    }

    /// Examples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.data.iter()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// One pass over the buffer in random order, split into batches of at
    /// most `batch_size` examples. The last batch may be shorter.
    pub fn shuffled_batches<R: Rng>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<Experience>>, ReplayError> {
        if batch_size == 0 {
            return Err(ReplayError::ZeroBatchSize);
        }

        let mut order: Vec<usize> = (0..self.data.len()).collect();
        order.shuffle(rng);

        Ok(order
            .chunks(batch_size)
            .map(|chunk| chunk.iter().map(|&i| self.data[i].clone()).collect())
            .collect())
    }
}

/// Experience buffer shared by parallel self-play workers.
#[derive(Debug)]
pub struct SharedExperienceBuffer {
    inner: Mutex<ExperienceBuffer>,
}

impl SharedExperienceBuffer {
    pub fn new(capacity: usize) -> Result<Self, ReplayError> {
        Ok(Self {
            inner: Mutex::new(ExperienceBuffer::new(capacity)?),
        })
    }

    /// Append one episode's examples as a single unit.
    pub fn extend<I: IntoIterator<Item = Experience>>(&self, examples: I) -> Result<(), ReplayError> {
        self.lock()?.extend(examples);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, ReplayError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ReplayError> {
        Ok(self.lock()?.is_empty())
    }

    /// Exclusive access to the underlying buffer.
    pub fn lock(&self) -> Result<MutexGuard<'_, ExperienceBuffer>, ReplayError> {
        self.inner.lock().map_err(|_| ReplayError::Poisoned)
    }

    pub fn into_inner(self) -> Result<ExperienceBuffer, ReplayError> {
        self.inner.into_inner().map_err(|_| ReplayError::Poisoned)
    }
}
