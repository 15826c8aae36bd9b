//! Time source for new records
//!
//! Injected so that record construction is deterministic under test.

use std::cell::Cell;

use chrono::Utc;

/// Supplies the timestamp of the next record, in seconds since epoch
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock with microsecond resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Clock that advances by a fixed step on every reading
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: Cell<f64>,
    step: f64,
}

impl SteppingClock {
    pub fn new(start: f64, step: f64) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> f64 {
        let value = self.next.get();
        self.next.set(value + self.step);
        value
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}
