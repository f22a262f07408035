//! Collaborators the timers read from: per-frame elapsed time and random draws.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::TimerError;

/// Supplies the time elapsed since the previous frame, in seconds.
///
/// The registry reads it once at the start of every sweep and hands the same
/// value to each timer it ticks.
pub trait TimeSource {
    fn delta_time(&self) -> f32;
}

impl<F> TimeSource for F
where
    F: Fn() -> f32,
{
    fn delta_time(&self) -> f32 {
        self()
    }
}

/// Frame delta set by the host before each sweep.
#[derive(Debug, Default)]
pub struct FrameClock {
    delta: Cell<f32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_delta(&self, seconds: f32) {
        self.delta.set(seconds);
    }

    pub fn set_delta_duration(&self, elapsed: Duration) {
        self.delta.set(elapsed.as_secs_f32());
    }
}

impl TimeSource for FrameClock {
    fn delta_time(&self) -> f32 {
        self.delta.get()
    }
}

/// Uniform draws over the half-open range `[lo, hi)`.
pub trait RandomSource {
    fn range(&self, lo: f32, hi: f32) -> f32;
}

/// Draws from the calling thread's RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn range(&self, lo: f32, hi: f32) -> f32 {
        if lo < hi {
            rand::thread_rng().gen_range(lo..hi)
        } else {
            lo
        }
    }
}

/// Reproducible draws from a seeded `StdRng`.
#[derive(Debug)]
pub struct SeededRandom {
    rng: RefCell<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn range(&self, lo: f32, hi: f32) -> f32 {
        if lo < hi {
            self.rng.borrow_mut().gen_range(lo..hi)
        } else {
            lo
        }
    }
}

/// Bounds for a randomized start time or frequency, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    min: f32,
    max: f32,
}

impl TimeRange {
    /// Both bounds and the width `max - min` must be finite, and
    /// `min <= max`. An empty range (`min == max`) always samples `min`.
    pub fn new(min: f32, max: f32) -> Result<Self, TimerError> {
        if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
            return Err(TimerError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn sample(&self, random: &dyn RandomSource) -> f32 {
        random.range(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_reports_last_delta() {
        let clock = FrameClock::new();
        assert_eq!(clock.delta_time(), 0.0);

        clock.set_delta(0.25);
        assert_eq!(clock.delta_time(), 0.25);

        clock.set_delta_duration(Duration::from_millis(500));
        assert_eq!(clock.delta_time(), 0.5);
    }

    #[test]
    fn test_closure_time_source() {
        let source = || 0.125_f32;
        assert_eq!(source.delta_time(), 0.125);
    }

    #[test]
    fn test_time_range_validation() {
        assert!(TimeRange::new(1.0, 2.0).is_ok());
        assert!(TimeRange::new(1.0, 1.0).is_ok());
        assert_eq!(
            TimeRange::new(2.0, 1.0),
            Err(TimerError::InvalidRange { min: 2.0, max: 1.0 })
        );
        assert!(TimeRange::new(f32::NAN, 1.0).is_err());
        assert!(TimeRange::new(0.0, f32::INFINITY).is_err());
        assert_eq!(
            TimeRange::new(-f32::MAX, f32::MAX),
            Err(TimerError::InvalidRange {
                min: -f32::MAX,
                max: f32::MAX,
            })
        );
    }

    #[test]
    fn test_widest_accepted_range_samples() {
        let range = TimeRange::new(-f32::MAX / 2.0, f32::MAX / 2.0).unwrap();
        let value = range.sample(&SeededRandom::new(1));
        assert!(value.is_finite());
        assert!(value >= range.min() && value < range.max());
    }

    #[test]
    fn test_seeded_draws_stay_in_range_and_repeat() {
        let range = TimeRange::new(0.5, 1.5).unwrap();
        let first = SeededRandom::new(7);
        let second = SeededRandom::new(7);

        for _ in 0..100 {
            let a = range.sample(&first);
            let b = range.sample(&second);
            assert_eq!(a, b);
            assert!((0.5..1.5).contains(&a), "{a} out of range");
        }
    }

    #[test]
    fn test_empty_range_yields_min() {
        let range = TimeRange::new(3.0, 3.0).unwrap();
        assert_eq!(range.sample(&ThreadRandom), 3.0);
        assert_eq!(range.sample(&SeededRandom::new(1)), 3.0);
    }
}
