//! Deadlines - How much time a slice of work may still use.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Time budget of one scheduling slice.
///
/// Queried once after every unit of work.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

/// Never expires. Drives a generation to completion in one slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Wall-clock budget starting at construction.
#[derive(Debug, Clone, Copy)]
pub struct FrameBudget {
    ends_at: Instant,
}

impl FrameBudget {
    pub fn new(budget: Duration) -> Self {
        Self {
            ends_at: Instant::now() + budget,
        }
    }

    pub fn until(ends_at: Instant) -> Self {
        Self { ends_at }
    }
}

impl Deadline for FrameBudget {
    fn time_remaining(&self) -> Duration {
        self.ends_at.saturating_duration_since(Instant::now())
    }
}

/// Expires after it has been queried `units` times.
///
/// Since the loop queries once per unit, a slice driven by
/// `UnitBudget::new(n)` performs exactly `n` units. The loop only asks
/// after a unit, so a budget of zero is taken as one.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units.max(1)),
        }
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        if left == 0 { Duration::ZERO } else { Duration::MAX }
    }
}

impl<D: Deadline + ?Sized> Deadline for &D {
    fn time_remaining(&self) -> Duration {
        (**self).time_remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_budget_counts_queries() {
        let budget = UnitBudget::new(3);
        assert_eq!(budget.time_remaining(), Duration::MAX);
        assert_eq!(budget.time_remaining(), Duration::MAX);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_zero_unit_budget_counts_as_one() {
        let budget = UnitBudget::new(0);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_frame_budget_expires() {
        let budget = FrameBudget::until(Instant::now());
        assert_eq!(budget.time_remaining(), Duration::ZERO);
        assert!(FrameBudget::new(Duration::from_secs(60)).time_remaining() > Duration::from_secs(1));
    }
}
