use std::rc::Rc;

use crate::registry::TimerRegistry;
use crate::source::{RandomSource, TimeRange};
use crate::timer::{TickOutcome, Timer, TimerKind, TimerTime};

/// A frequency timer whose interval is redrawn from a range after every
/// pulse.
pub struct Sporadic {
    range: TimeRange,
    current_frequency: f32,
    random: Rc<dyn RandomSource>,
}

impl Sporadic {
    fn redraw(&mut self) {
        self.current_frequency = self.range.sample(&*self.random);
    }
}

impl TimerKind for Sporadic {
    fn tick(&mut self, time: &mut TimerTime, delta: f32) -> TickOutcome {
        time.current += delta;
        if time.current >= self.current_frequency {
            time.current = 0.0;
            self.redraw();
            TickOutcome::Elapsed
        } else {
            TickOutcome::Continue
        }
    }

    fn reset(&mut self, time: &mut TimerTime) {
        time.current = 0.0;
        self.redraw();
    }
}

pub type SporadicTimer = Timer<Sporadic>;

impl Timer<Sporadic> {
    pub fn new(registry: &TimerRegistry, range: TimeRange) -> Self {
        let mut kind = Sporadic {
            range,
            current_frequency: range.min(),
            random: registry.random_source(),
        };
        kind.redraw();
        Self::with_kind(registry, 0.0, kind)
    }

    /// Interval until the next pulse.
    pub fn current_frequency(&self) -> f32 {
        self.read(|_, kind| kind.current_frequency)
    }

    pub fn range(&self) -> TimeRange {
        self.read(|_, kind| kind.range)
    }

    /// Rebind the range, redraw the interval and rewind to zero.
    pub fn reset_between(&self, range: TimeRange) {
        self.reset_with(|time, kind| {
            time.current = 0.0;
            kind.range = range;
            kind.redraw();
        });
    }
}
