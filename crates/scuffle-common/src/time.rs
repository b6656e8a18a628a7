//! Simulation time.
//!
//! All timed effects (recoil windows, respawn delays, cooldowns, damage
//! flashes) are expressed as deadlines on this clock and checked once per
//! tick.

use serde::{Deserialize, Serialize};

/// A point on the simulation clock, in seconds since the arena started.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SimTime(f64);

impl SimTime {
    /// Start of the simulation.
    pub const ZERO: Self = Self(0.0);

    /// Creates a time from seconds.
    #[must_use]
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Returns the time in seconds.
    #[must_use]
    pub const fn as_secs(self) -> f64 {
        self.0
    }

    /// Returns the time `duration` seconds after this one.
    #[must_use]
    pub fn after(self, duration: f32) -> Self {
        Self(self.0 + f64::from(duration))
    }

    /// Seconds from `self` until `later`, clamped at zero.
    #[must_use]
    pub fn until(self, later: Self) -> f32 {
        (later.0 - self.0).max(0.0) as f32
    }

    /// Whether a deadline at `self` has been reached at `now`.
    #[must_use]
    pub fn has_passed(self, now: Self) -> bool {
        now.0 >= self.0
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Monotonic simulation clock advanced by the external driver loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    /// Current time
    now: SimTime,
    /// Number of completed ticks
    tick: u64,
}

impl SimClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: SimTime::ZERO,
            tick: 0,
        }
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.now
    }

    /// Number of ticks advanced so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the clock by one tick of `dt` seconds and returns the new time.
    pub fn advance(&mut self, dt: f32) -> SimTime {
        self.now = self.now.after(dt);
        self.tick += 1;
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_passed_is_inclusive() {
        let deadline = SimTime::from_secs(1.0);
        assert!(!deadline.has_passed(SimTime::from_secs(0.999)));
        assert!(deadline.has_passed(SimTime::from_secs(1.0)));
        assert!(deadline.has_passed(SimTime::from_secs(1.5)));
    }

    #[test]
    fn test_until_clamps_at_zero() {
        let now = SimTime::from_secs(5.0);
        assert_eq!(now.until(SimTime::from_secs(3.0)), 0.0);
        assert!((now.until(SimTime::from_secs(5.5)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clock_advance() {
        let mut clock = SimClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.tick(), 2);
        assert!((clock.now().as_secs() - 0.75).abs() < 1e-9);
    }
}
