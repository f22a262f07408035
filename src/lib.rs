//! # Frame Timers
//!
//! Frame-driven timers for real-time host applications such as game loops.
//!
//! Every timer is advanced by a [`TimerRegistry`] sweep that the host runs
//! once per frame. The registry reads the frame's elapsed time from an
//! injected [`TimeSource`] and ticks each active timer exactly once, even when
//! timers start, stop or drop each other in the middle of the sweep.
//!
//! ## Features
//!
//! - **Countdown**: counts down from a start time and stops itself at zero
//! - **Frequency**: pulses at a fixed interval
//! - **Sporadic**: pulses at intervals redrawn from a random range
//! - **Stopwatch**: counts up and records laps
//! - **Listeners**: start, stop, pause, resume, reset and pulse notifications
//! - **Frame Loop**: a Tokio-driven host pulse with graceful shutdown
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use frame_timers::{CountdownTimer, FrameClock, TimerEvent, TimerRegistry};
//!
//! let clock = Rc::new(FrameClock::new());
//! let registry = TimerRegistry::new(clock.clone());
//!
//! let countdown = CountdownTimer::new(&registry, 1.0);
//! let finished = Rc::new(Cell::new(false));
//! {
//!     let finished = finished.clone();
//!     countdown.subscribe(TimerEvent::Stopped, move || finished.set(true));
//! }
//! countdown.start();
//!
//! // One sweep per frame, each frame a quarter second long.
//! clock.set_delta(0.25);
//! while !finished.get() {
//!     registry.advance_all();
//! }
//!
//! assert!(countdown.is_finished());
//! assert!(registry.is_empty());
//! ```

mod error;
mod frame_loop;
mod registry;
mod source;
mod timer;
pub mod timers;

pub use error::TimerError;
pub use frame_loop::{FrameCommand, FrameLoop, FrameLoopHandle};
pub use registry::{TimerId, TimerRegistry};
pub use source::{FrameClock, RandomSource, SeededRandom, ThreadRandom, TimeRange, TimeSource};
pub use timer::{
    ListenerId, TickOutcome, Timer, TimerEvent, TimerHandle, TimerKind, TimerState, TimerTime,
};
pub use timers::{CountdownTimer, FrequencyTimer, Lap, SporadicTimer, StopwatchTimer};

// Re-export commonly used types for convenience
pub use std::time::Duration;
pub use tokio_util::sync::CancellationToken;
