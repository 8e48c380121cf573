//! # Rolling History
//!
//! Fixed-capacity ring buffer of telemetry samples backing the RPM chart.

/// Default number of samples kept for display
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// One telemetry reading stamped with session time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// Seconds since session start
    pub elapsed_secs: f64,
    pub rpm: f64,
    pub pwm: i32,
}

/// Ring buffer holding the most recent samples, oldest evicted first
///
/// Slots are written in place once the buffer is full; `head` points at the
/// oldest sample.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    samples: Vec<TelemetrySample>,
    head: usize,
    capacity: usize,
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RollingHistory {
    /// Create an empty history; a zero capacity is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, sample: TelemetrySample) {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.head] = sample;
            self.head = (self.head + 1) % self.capacity;
        }
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

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<&TelemetrySample> {
        if self.samples.is_empty() {
            return None;
        }
        let newest = (self.head + self.samples.len() - 1) % self.samples.len();
        self.samples.get(newest)
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> + '_ {
        let (newer, older) = self.samples.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Chart series as `(elapsed_secs, rpm)` points in insertion order
    pub fn series(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.iter().map(|s| (s.elapsed_secs, s.rpm))
    }
}
