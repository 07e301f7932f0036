//! Millisecond clocks for driving playback.

use std::{cell::Cell, time::Instant};

/// A monotonic millisecond clock.
///
/// Readings only need to be comparable with each other. The animation loop tolerates
/// a clock that goes backwards, it just recomputes targets without smoothing.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Wall-clock time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to. Used for offline simulation and tests.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ms: Cell<f64>,
}

impl ManualClock {
    pub fn new(now_ms: f64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}
