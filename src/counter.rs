//! The task counter behind every bar.
//!
//! A [`Counter`] tracks how many tasks are done out of a known total, advancing by a
//! configurable step. Its three values live in atomics: the caller's thread is the only
//! writer, while the background refresh worker reads them on every frame without taking
//! a lock.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::BarError;

/// Tracks `current` out of `total` tasks, advancing by `step`.
///
/// `current` never exceeds `total`: every advance saturates.
#[derive(Debug)]
pub struct Counter {
    total: AtomicU64,
    step: AtomicU64,
    current: AtomicU64,
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Counter {
    /// Creates a counter at zero.
    ///
    /// A zero `total` is accepted here so a bar can be configured later; it is rejected
    /// when the bar is first updated.
    #[must_use]
    pub const fn new(total: u64, step: u64) -> Self {
        Self {
            total: AtomicU64::new(total),
            step: AtomicU64::new(step),
            current: AtomicU64::new(0),
        }
    }

    /// Returns the total number of tasks.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Returns the step applied by [`step_forward`](Self::step_forward).
    #[must_use]
    pub fn step(&self) -> u64 {
        self.step.load(Ordering::Acquire)
    }

    /// Returns the number of tasks done.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    /// Returns how many tasks are left.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.total().saturating_sub(self.current())
    }

    /// Sets the total number of tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::InvalidConfig`] if `total` is zero.
    pub fn set_total(&self, total: u64) -> Result<(), BarError> {
        if total == 0 {
            return Err(BarError::zero_total());
        }
        self.total.store(total, Ordering::Release);
        Ok(())
    }

    /// Sets the step size.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::InvalidConfig`] if `step` is zero.
    pub fn set_step(&self, step: u64) -> Result<(), BarError> {
        if step == 0 {
            return Err(BarError::zero_step());
        }
        self.step.store(step, Ordering::Release);
        Ok(())
    }

    /// Adds `by` to the position, clamping at the total.
    pub fn advance(&self, by: u64) {
        let total = self.total();
        // Single writer: a plain load/store pair cannot lose an update.
        let next = self.current().saturating_add(by).min(total);
        self.current.store(next, Ordering::Release);
    }

    /// Advances by the configured step.
    pub fn step_forward(&self) {
        self.advance(self.step());
    }

    /// Returns `true` once the position has reached the total.
    ///
    /// The last advance may be a partial step; it is clamped to the total and still
    /// finishes the counter.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Rewinds the position to zero, keeping total and step.
    pub fn rewind(&self) {
        self.current.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::Counter;
    use crate::BarError;

    /// Step Count
    /// Repeated steps finish in exactly ceil(total / step) advances without overshooting.
    #[test]
    fn test_finishes_after_ceil_steps() {
        for (total, step) in [(4u64, 1u64), (10, 3), (10, 5), (7, 10), (1, 1), (100, 7)] {
            let counter = Counter::new(total, step);
            let mut calls = 0;
            while !counter.is_finished() {
                counter.step_forward();
                calls += 1;
                assert!(counter.current() <= total);
            }
            assert_eq!(calls, total.div_ceil(step), "total={total} step={step}");
            assert_eq!(counter.current(), total);
        }
    }

    /// Saturation
    /// Oversized advances clamp to the total.
    #[test]
    fn test_advance_saturates() {
        let counter = Counter::new(5, 1);
        counter.advance(3);
        assert_eq!(counter.remaining(), 2);
        counter.advance(u64::MAX);
        assert_eq!(counter.current(), 5);
        assert!(counter.is_finished());
    }

    /// Validation
    /// Zero totals and steps are rejected and leave the counter untouched.
    #[test]
    fn test_rejects_zero() {
        let counter = Counter::new(8, 2);
        assert_eq!(counter.set_total(0), Err(BarError::zero_total()));
        assert_eq!(counter.set_step(0), Err(BarError::zero_step()));
        assert_eq!(counter.total(), 8);
        assert_eq!(counter.step(), 2);
    }

    /// Rewind
    /// Rewinding clears progress but remembers the configuration.
    #[test]
    fn test_rewind_keeps_config() {
        let counter = Counter::new(3, 2);
        counter.step_forward();
        counter.step_forward();
        assert!(counter.is_finished());

        counter.rewind();
        assert!(!counter.is_finished());
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.total(), 3);
        assert_eq!(counter.step(), 2);
    }
}
