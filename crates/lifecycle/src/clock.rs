use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of elapsed seconds for the frame driver.
pub trait Clock {
    /// Seconds since the clock was created.
    fn elapsed(&self) -> f64;
}

/// Monotonic wall clock.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for WallClock {
    fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the stage.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.elapsed() + seconds);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared() {
        let a = ManualClock::new();
        let b = a.clone();
        assert_eq!(b.elapsed(), 0.0);
        a.advance(0.5);
        a.advance(0.25);
        assert_eq!(b.elapsed(), 0.75);
        b.set(2.0);
        assert_eq!(a.elapsed(), 2.0);
    }

    #[test]
    fn wall_clock_does_not_go_backwards() {
        let c = WallClock::start();
        let t0 = c.elapsed();
        let t1 = c.elapsed();
        assert!(t1 >= t0);
    }
}
