//! Root configuration.

use std::time::Duration;

/// Tuning knobs for a [`Root`](crate::scheduler::Root).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootConfig {
    /// Yield once a slice's remaining time drops below this.
    pub yield_threshold: Duration,
    /// Hard cap on units of work per slice, regardless of the deadline.
    pub max_units_per_slice: Option<usize>,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            max_units_per_slice: None,
        }
    }
}

impl RootConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    pub fn max_units_per_slice(mut self, units: usize) -> Self {
        self.max_units_per_slice = Some(units);
        self
    }
}
