use crate::registry::TimerRegistry;
use crate::source::TimeRange;
use crate::timer::{TickOutcome, Timer, TimerKind, TimerTime};

/// Fires [`TimerEvent::Ticked`](crate::TimerEvent::Ticked) every `frequency`
/// seconds.
///
/// At most one pulse per tick. Time past the threshold is dropped, so the
/// pulses drift by the overshoot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequency {
    frequency: f32,
}

impl TimerKind for Frequency {
    fn tick(&mut self, time: &mut TimerTime, delta: f32) -> TickOutcome {
        time.current += delta;
        if time.current >= self.frequency {
            time.current = 0.0;
            TickOutcome::Elapsed
        } else {
            TickOutcome::Continue
        }
    }

    fn reset(&mut self, time: &mut TimerTime) {
        time.current = 0.0;
    }
}

pub type FrequencyTimer = Timer<Frequency>;

impl Timer<Frequency> {
    pub fn new(registry: &TimerRegistry, frequency: f32) -> Self {
        Self::with_kind(registry, 0.0, Frequency { frequency })
    }

    /// Frequency timer whose interval is drawn once from `range`.
    pub fn between(registry: &TimerRegistry, range: TimeRange) -> Self {
        let frequency = range.sample(registry.random());
        Self::new(registry, frequency)
    }

    pub fn frequency(&self) -> f32 {
        self.read(|_, kind| kind.frequency)
    }

    pub fn reset_to(&self, frequency: f32) {
        self.reset_with(|time, kind| {
            time.current = 0.0;
            kind.frequency = frequency;
        });
    }

    pub fn reset_between(&self, range: TimeRange) {
        let frequency = range.sample(self.registry().random());
        self.reset_to(frequency);
    }
}
