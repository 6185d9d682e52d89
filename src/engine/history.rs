//! Pointer Motion History
//!
//! Fixed-capacity ring of recent pointer samples. The resistance policy
//! compares the instantaneous speed against a short-horizon reference
//! pulled from this ring to tell a deliberate push from an overshoot.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use thiserror::Error;

/// History ring errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// The ring was queried before it was ever populated
    #[error("pointer history queried before first population")]
    EmptyHistory,
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// One observed pointer state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Pointer x position in virtual desktop pixels
    pub x: i32,
    /// Pointer y position in virtual desktop pixels
    pub y: i32,

    /// Euclidean norm of the motion delta that produced this sample
    pub speed: f64,

    /// Raw x motion delta reported with the event
    pub motion_dx: f64,
    /// Raw y motion delta reported with the event
    pub motion_dy: f64,

    /// When the sample was observed
    pub timestamp: Instant,
}

impl PointerSample {
    /// Create a stationary sample, used when pre-filling the ring
    pub fn at_rest(x: i32, y: i32, timestamp: Instant) -> Self {
        Self {
            x,
            y,
            speed: 0.0,
            motion_dx: 0.0,
            motion_dy: 0.0,
            timestamp,
        }
    }
}

/// Fixed-capacity FIFO of recent pointer samples
///
/// Pushing at capacity evicts the oldest entry, so the ring always holds
/// the last `capacity` samples once warmed up. [`reset`](Self::reset)
/// pre-fills the ring to capacity so downstream queries never observe a
/// partially-filled window after a monitor layout change.
#[derive(Debug)]
pub struct PointerHistory {
    samples: VecDeque<PointerSample>,
    capacity: usize,
}

impl PointerHistory {
    /// Create an empty ring holding up to `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Discard all samples and pre-fill the ring to capacity with copies
    /// of the current position at zero speed.
    pub fn reset(&mut self, x: i32, y: i32, now: Instant) {
        self.samples.clear();
        for _ in 0..self.capacity {
            self.samples.push_back(PointerSample::at_rest(x, y, now));
        }
    }

    /// Append a sample, evicting the oldest first when at capacity
    pub fn push(&mut self, sample: PointerSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// The most recently pushed sample.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::EmptyHistory`] if the ring has never been
    /// populated. After initialization the ring is always pre-filled, so
    /// hitting this is a caller contract violation.
    pub fn latest(&self) -> Result<&PointerSample> {
        self.samples.back().ok_or(HistoryError::EmptyHistory)
    }

    /// Speed of the first sample, in insertion order, whose age at `now`
    /// is at most `max_age`. Returns 0 when no sample qualifies.
    ///
    /// Scanning oldest-first means the result is the *earliest* speed
    /// still inside the window: "how fast was the pointer already moving
    /// `max_age` ago", not "how fast was it an instant ago".
    pub fn speed_before(&self, now: Instant, max_age: Duration) -> f64 {
        for sample in &self.samples {
            if now.duration_since(sample.timestamp) <= max_age {
                return sample.speed;
            }
        }
        0.0
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the ring has never been populated
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
