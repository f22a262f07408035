use crate::registry::TimerRegistry;
use crate::source::TimeRange;
use crate::timer::{TickOutcome, Timer, TimerKind, TimerTime};

/// Counts down from the start time and stops itself at zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Countdown;

impl TimerKind for Countdown {
    /// The tick that reaches zero only subtracts; the following tick stops.
    fn tick(&mut self, time: &mut TimerTime, delta: f32) -> TickOutcome {
        if time.current > 0.0 {
            time.current -= delta;
            TickOutcome::Continue
        } else {
            TickOutcome::Stop
        }
    }
}

pub type CountdownTimer = Timer<Countdown>;

impl Timer<Countdown> {
    pub fn new(registry: &TimerRegistry, start_time: f32) -> Self {
        Self::with_kind(registry, start_time, Countdown)
    }

    /// Countdown with a start time drawn from `range`.
    pub fn between(registry: &TimerRegistry, range: TimeRange) -> Self {
        let start_time = range.sample(registry.random());
        Self::new(registry, start_time)
    }

    /// Completion from 0 (full) to 1 (finished).
    pub fn progress(&self) -> f32 {
        self.read(|time, _| {
            let remaining = time.current / time.start;
            if remaining.is_nan() {
                1.0
            } else {
                1.0 - remaining.clamp(0.0, 1.0)
            }
        })
    }

    pub fn is_finished(&self) -> bool {
        self.read(|time, _| time.current <= 0.0)
    }

    /// Rebind the start time and rewind to it.
    pub fn reset_to(&self, start_time: f32) {
        self.reset_with(|time, _| {
            time.start = start_time;
            time.current = start_time;
        });
    }

    /// Rebind the start time to a draw from `range` and rewind to it.
    pub fn reset_between(&self, range: TimeRange) {
        let start_time = range.sample(self.registry().random());
        self.reset_to(start_time);
    }
}
