//! Time management utilities

use std::time::{Duration, Instant};

/// Steady clock tracking elapsed time and per-frame deltas
///
/// The delta reported by [`Clock::delta_time`] is scaled by the time scale;
/// the total elapsed duration is not.
pub struct Clock {
    last_tick: Instant,
    elapsed: Duration,
    delta_time: f32,
    time_scale: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            elapsed: Duration::ZERO,
            delta_time: 0.0,
            time_scale: 1.0,
        }
    }

    /// Advance the clock (should be called once per frame)
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.advance(now.duration_since(self.last_tick));
        self.last_tick = now;
    }

    /// Advance the clock by an explicit duration
    pub fn advance(&mut self, step: Duration) {
        self.elapsed += step;
        self.delta_time = step.as_secs_f32() * self.time_scale;
    }

    /// Get the scaled time since the last tick in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the unscaled total elapsed time
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale; negative values are clamped to zero
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_applies_time_scale() {
        let mut clock = Clock::new();
        clock.set_time_scale(0.5);
        clock.advance(Duration::from_millis(100));

        assert!((clock.delta_time() - 0.05).abs() < 1e-6);
        assert_eq!(clock.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn test_negative_time_scale_clamped() {
        let mut clock = Clock::new();
        clock.set_time_scale(-2.0);
        assert_eq!(clock.time_scale(), 0.0);
    }
}
