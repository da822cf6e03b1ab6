//! Bounded window of recent order-creation latencies.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of samples kept
pub const DEFAULT_WINDOW_SIZE: usize = 1024;

/// Rolling latency window; only the most recent `capacity` samples count toward the average.
#[derive(Debug)]
pub struct LatencyTracker {
    capacity: usize,
    samples: Mutex<VecDeque<f64>>,
}

impl LatencyTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Record one sample, dropping the oldest when the window is full
    pub fn record(&self, elapsed: Duration) {
        let millis = elapsed.as_secs_f64() * 1000.0;
        let mut samples = self.samples.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(millis);
    }

    /// Mean of the window in milliseconds, rounded to 2 decimal places; 0 when empty
    pub fn average_ms(&self) -> f64 {
        let samples = self.samples.lock();
        if samples.is_empty() {
            return 0.0;
        }
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        (mean * 100.0).round() / 100.0
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
