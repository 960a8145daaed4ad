//! Fixed-interval simulation clock.

/// Shortest accepted tick interval in seconds.
pub const MIN_INTERVAL: f32 = 0.05;
/// Longest accepted tick interval in seconds.
pub const MAX_INTERVAL: f32 = 10.0;
/// Default tick interval in seconds.
pub const DEFAULT_INTERVAL: f32 = 0.5;

/// Accumulator clock decoupling simulation cadence from display cadence.
///
/// `tick` fires at most once per call; after a long stall the leftover is
/// clamped to a single interval so the simulation never runs a catch-up
/// burst of ticks.
#[derive(Clone, Copy, Debug)]
pub struct SimClock {
    interval: f32,
    accumulator: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl SimClock {
    /// Clock with the given interval, clamped into the supported range.
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.clamp(MIN_INTERVAL, MAX_INTERVAL),
            accumulator: 0.0,
        }
    }

    /// Accumulate `dt` seconds and report whether a tick fires.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.accumulator += dt.max(0.0);
        if self.accumulator < self.interval {
            return false;
        }
        self.accumulator -= self.interval;
        // One interval of leftover at most; stalls never burst.
        if self.accumulator > self.interval {
            self.accumulator = self.interval;
        }
        true
    }

    /// Change the interval without disturbing the accumulator. Returns the
    /// applied (possibly clamped) value.
    pub fn set_interval(&mut self, seconds: f32) -> f32 {
        self.interval = seconds.clamp(MIN_INTERVAL, MAX_INTERVAL);
        self.interval
    }

    /// Current interval in seconds.
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Seconds currently accumulated toward the next tick.
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Drop any accumulated time (reseed path).
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_with_leftover() {
        let mut c = SimClock::new(0.5);
        assert!(!c.tick(0.3));
        assert!(!c.tick(0.3));
        assert!(c.tick(0.3));
        assert!((c.accumulated() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn stall_does_not_burst() {
        let mut c = SimClock::new(0.5);
        assert!(c.tick(10.0));
        assert!(c.accumulated() <= c.interval());
        // The clamped leftover still fires the very next tick.
        assert!(c.tick(0.0));
    }

    #[test]
    fn set_interval_clamps_and_keeps_accumulator() {
        let mut c = SimClock::new(0.5);
        c.tick(0.2);
        assert_eq!(c.set_interval(1000.0), MAX_INTERVAL);
        assert_eq!(c.set_interval(0.0), MIN_INTERVAL);
        assert!((c.accumulated() - 0.2).abs() < 1e-6);
    }
}
