//! The built-in timer kinds.

mod countdown;
mod frequency;
mod sporadic;
mod stopwatch;

pub use countdown::{Countdown, CountdownTimer};
pub use frequency::{Frequency, FrequencyTimer};
pub use sporadic::{Sporadic, SporadicTimer};
pub use stopwatch::{Lap, Stopwatch, StopwatchTimer};
