//! Bounded motion history per tracked point
//!
//! The raw substrate for pattern and velocity detection. Capacity is fixed at
//! construction; pushing past it evicts the oldest sample.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default history length for gesture buffers
pub const DEFAULT_CAPACITY: usize = 15;

/// A single timestamped landmark sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPoint {
    pub pos: Vec2,
    /// Seconds since session start
    pub t: f32,
}

impl TrackedPoint {
    pub fn new(pos: Vec2, t: f32) -> Self {
        Self { pos, t }
    }
}

/// Fixed-capacity FIFO of samples with strictly increasing timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionBuffer {
    capacity: usize,
    samples: VecDeque<TrackedPoint>,
}

impl Default for MotionBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MotionBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a sample. Returns false (and drops it) when `t` is not newer
    /// than the last recorded sample.
    pub fn push(&mut self, point: TrackedPoint) -> bool {
        if let Some(last) = self.samples.back() {
            if point.t <= last.t {
                log::trace!("Dropping stale sample t={} (last t={})", point.t, last.t);
                return false;
            }
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(point);
        true
    }

    pub fn clear(&mut self) {
        self.samples.clear();
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

    pub fn latest(&self) -> Option<TrackedPoint> {
        self.samples.back().copied()
    }

    /// Oldest-first iterator
    pub fn iter(&self) -> impl Iterator<Item = &TrackedPoint> {
        self.samples.iter()
    }

    /// The most recent `n` samples, oldest first (fewer if not enough recorded)
    pub fn recent(&self, n: usize) -> Vec<TrackedPoint> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }

    /// Positions only, oldest first (for trail rendering)
    pub fn positions(&self) -> Vec<Vec2> {
        self.samples.iter().map(|s| s.pos).collect()
    }
}
