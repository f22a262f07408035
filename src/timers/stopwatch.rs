use std::fmt;

use crate::registry::TimerRegistry;
use crate::timer::{TickOutcome, Timer, TimerKind, TimerState, TimerTime};

/// One recorded split of a stopwatch run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lap {
    /// 1-based, contiguous within a run
    pub number: u32,
    /// Time since the previous lap (or the start, for lap 1)
    pub lap_time: f32,
    /// Stopwatch time when the lap was taken
    pub overall_time: f32,
    /// `lap_time` minus the previous lap's; `None` for lap 1
    pub difference: Option<f32>,
}

impl fmt::Display for Lap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lap {} [Time: {}, Overall: {}, Difference: ",
            self.number, self.lap_time, self.overall_time
        )?;
        match self.difference {
            Some(difference) => write!(f, "{}]", difference),
            None => write!(f, "N/A]"),
        }
    }
}

/// Counts up from zero with no threshold and records laps.
///
/// Starting always begins a fresh run; only pause/resume keep the
/// accumulated time.
#[derive(Debug, Default, Clone)]
pub struct Stopwatch {
    laps: Vec<Lap>,
}

impl TimerKind for Stopwatch {
    fn tick(&mut self, time: &mut TimerTime, delta: f32) -> TickOutcome {
        time.current += delta;
        TickOutcome::Continue
    }

    fn rewind(&mut self, time: &mut TimerTime) {
        time.current = 0.0;
        self.laps.clear();
    }

    fn reset(&mut self, time: &mut TimerTime) {
        time.current = 0.0;
        self.laps.clear();
    }
}

pub type StopwatchTimer = Timer<Stopwatch>;

impl Timer<Stopwatch> {
    pub fn new(registry: &TimerRegistry) -> Self {
        Self::with_kind(registry, 0.0, Stopwatch::default())
    }

    /// Record a lap at the current time. Returns `None` (and records
    /// nothing) unless the stopwatch is running.
    pub fn add_lap(&self) -> Option<Lap> {
        self.update(|state, time, kind| {
            if state != TimerState::Running {
                return None;
            }

            let lap = match kind.laps.last() {
                Some(previous) => {
                    let lap_time = time.current - previous.overall_time;
                    Lap {
                        number: previous.number + 1,
                        lap_time,
                        overall_time: time.current,
                        difference: Some(lap_time - previous.lap_time),
                    }
                }
                None => Lap {
                    number: 1,
                    lap_time: time.current,
                    overall_time: time.current,
                    difference: None,
                },
            };
            kind.laps.push(lap);
            Some(lap)
        })
    }

    pub fn lap(&self, number: u32) -> Option<Lap> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        self.read(|_, kind| kind.laps.get(index).copied())
    }

    /// All laps of the current run, in order.
    pub fn laps(&self) -> Vec<Lap> {
        self.read(|_, kind| kind.laps.clone())
    }

    pub fn lap_count(&self) -> usize {
        self.read(|_, kind| kind.laps.len())
    }

    /// Number of the latest lap, 0 before the first.
    pub fn current_lap_number(&self) -> u32 {
        self.read(|_, kind| kind.laps.last().map_or(0, |lap| lap.number))
    }

    pub fn current_lap(&self) -> Option<Lap> {
        self.read(|_, kind| kind.laps.last().copied())
    }
}
