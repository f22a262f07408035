use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::registry::TimerRegistry;
use crate::source::{FrameClock, RandomSource};
use crate::TimerError;

/// Host-side frame pulse: advances a [`TimerRegistry`] once per frame.
///
/// The registry and its timers are not `Send`, so the loop is awaited on the
/// thread that owns them (a current-thread runtime or a `LocalSet`).
pub struct FrameLoop {
    /// Instance name for logging
    name: String,

    /// Channel for receiving host commands
    command_rx: mpsc::Receiver<FrameCommand>,

    /// Delta source of the registry, set once per frame
    clock: Rc<FrameClock>,

    registry: TimerRegistry,

    frame_interval: Duration,

    /// Cancellation token for graceful shutdown
    cancel_token: CancellationToken,
}

/// Handle for controlling a running frame loop, usable from any thread
#[derive(Clone)]
pub struct FrameLoopHandle {
    command_tx: mpsc::Sender<FrameCommand>,
}

/// Frame loop command enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCommand {
    /// Dispose every active timer
    ClearAll,
    /// Leave the loop; active timers are cleared on the way out
    Shutdown,
}

impl FrameLoop {
    /// Create a new FrameLoop with its own registry
    ///
    /// # Arguments
    /// * `name` - Frame loop instance name
    /// * `frame_interval` - Time between frames
    /// * `command_buffer_size` - Size of command channel buffer
    /// * `cancel_token` - Stops the loop when cancelled
    ///
    /// Returns (FrameLoop, FrameLoopHandle)
    pub fn new(
        name: String,
        frame_interval: Duration,
        command_buffer_size: usize,
        cancel_token: CancellationToken,
    ) -> Result<(Self, FrameLoopHandle), TimerError> {
        if frame_interval.is_zero() {
            return Err(TimerError::ZeroFrameInterval);
        }
        if command_buffer_size == 0 {
            return Err(TimerError::ZeroBufferSize);
        }

        let (command_tx, command_rx) = mpsc::channel(command_buffer_size);
        let clock = Rc::new(FrameClock::new());
        let registry = TimerRegistry::new(clock.clone());

        let frame_loop = FrameLoop {
            name,
            command_rx,
            clock,
            registry,
            frame_interval,
            cancel_token,
        };

        Ok((frame_loop, FrameLoopHandle { command_tx }))
    }

    /// Replace the registry's random source. Call before creating timers:
    /// this builds a fresh registry.
    pub fn with_random(mut self, random: Rc<dyn RandomSource>) -> Self {
        self.registry = TimerRegistry::with_random(self.clock.clone(), random);
        self
    }

    /// The registry to create timers with.
    pub fn registry(&self) -> TimerRegistry {
        self.registry.clone()
    }

    /// Run frames until shutdown or cancellation. Returns the number of
    /// frames advanced.
    pub async fn run(mut self) -> u64 {
        let mut frames = interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_frame = Instant::now();
        let mut frame_count: u64 = 0;

        log::info!("Frame loop '{}' started", self.name);

        loop {
            tokio::select! {
                // Handle incoming commands
                Some(command) = self.command_rx.recv() => {
                    if self.handle_command(command) {
                        break;
                    }
                },

                // Advance all timers
                now = frames.tick() => {
                    self.clock.set_delta_duration(now.saturating_duration_since(last_frame));
                    last_frame = now;
                    self.registry.advance_all();
                    frame_count += 1;
                },

                // Handle cancellation token
                _ = self.cancel_token.cancelled() => {
                    log::info!("Frame loop '{}' cancelled via token", self.name);
                    break;
                },
            }
        }

        self.registry.clear_all();
        log::info!(
            "Frame loop '{}' stopped after {} frame(s)",
            self.name,
            frame_count
        );
        frame_count
    }

    /// Handle host commands, returns true on shutdown
    fn handle_command(&mut self, command: FrameCommand) -> bool {
        match command {
            FrameCommand::ClearAll => {
                log::debug!("Frame loop '{}' clearing all timers", self.name);
                self.registry.clear_all();
                false
            }
            FrameCommand::Shutdown => {
                log::info!("Frame loop '{}' shutting down", self.name);
                true
            }
        }
    }
}

impl FrameLoopHandle {
    /// Dispose every active timer at the next opportunity
    pub async fn clear_all(&self) -> Result<(), mpsc::error::SendError<FrameCommand>> {
        self.command_tx.send(FrameCommand::ClearAll).await
    }

    /// Dispose every active timer (non-blocking)
    pub fn try_clear_all(&self) -> Result<(), mpsc::error::TrySendError<FrameCommand>> {
        self.command_tx.try_send(FrameCommand::ClearAll)
    }

    /// Shutdown the frame loop
    pub async fn shutdown(&self) -> Result<(), mpsc::error::SendError<FrameCommand>> {
        self.command_tx.send(FrameCommand::Shutdown).await
    }

    /// Shutdown the frame loop (non-blocking)
    pub fn try_shutdown(&self) -> Result<(), mpsc::error::TrySendError<FrameCommand>> {
        self.command_tx.try_send(FrameCommand::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SeededRandom;
    use crate::{
        CountdownTimer, FrequencyTimer, SporadicTimer, StopwatchTimer, TimeRange, TimerEvent,
    };
    use std::cell::Cell;
    use tokio::time::sleep;
    use tokio_test::assert_ok;

    fn frame_loop(cancel_token: &CancellationToken) -> (FrameLoop, FrameLoopHandle) {
        FrameLoop::new(
            "test".to_string(),
            Duration::from_millis(10),
            10, // command buffer size
            cancel_token.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_configuration() {
        let cancel_token = CancellationToken::new();
        let zero_interval =
            FrameLoop::new("test".to_string(), Duration::ZERO, 10, cancel_token.clone());
        assert!(matches!(zero_interval, Err(TimerError::ZeroFrameInterval)));

        let zero_buffer =
            FrameLoop::new("test".to_string(), Duration::from_millis(10), 0, cancel_token);
        assert!(matches!(zero_buffer, Err(TimerError::ZeroBufferSize)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_loop_drives_timers() {
        let cancel_token = CancellationToken::new();
        let (frame_loop, handle) = frame_loop(&cancel_token);
        let registry = frame_loop.registry();

        let countdown = CountdownTimer::new(&registry, 0.05);
        let stopwatch = StopwatchTimer::new(&registry);
        let stops = Rc::new(Cell::new(0));
        {
            let stops = Rc::clone(&stops);
            countdown.subscribe(TimerEvent::Stopped, move || stops.set(stops.get() + 1));
        }
        countdown.start();
        stopwatch.start();

        let (frames, ()) = tokio::join!(frame_loop.run(), async {
            sleep(Duration::from_millis(205)).await;
            assert_ok!(handle.shutdown().await);
        });

        assert!(frames >= 20, "only {frames} frames ran");
        assert_eq!(stops.get(), 1);
        assert!(!countdown.is_running());
        assert!(countdown.is_finished());

        // Teardown clears whatever was still running.
        assert!(!stopwatch.is_running());
        assert!(registry.is_empty());
        assert!(stopwatch.current_time() > 0.15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_frequency_pulses_per_frame_interval() {
        let cancel_token = CancellationToken::new();
        let (frame_loop, handle) = frame_loop(&cancel_token);
        let registry = frame_loop.registry();

        let frequency = FrequencyTimer::new(&registry, 0.045);
        let pulses = Rc::new(Cell::new(0));
        {
            let pulses = Rc::clone(&pulses);
            frequency.subscribe(TimerEvent::Ticked, move || pulses.set(pulses.get() + 1));
        }
        frequency.start();

        tokio::join!(frame_loop.run(), async {
            sleep(Duration::from_millis(255)).await;
            assert_ok!(handle.shutdown().await);
        });

        // Pulses land every fifth frame since overshoot is dropped.
        assert!((4..=5).contains(&pulses.get()), "{} pulses", pulses.get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_command() {
        let cancel_token = CancellationToken::new();
        let (frame_loop, handle) = frame_loop(&cancel_token);
        let registry = frame_loop.registry();

        let frequency = FrequencyTimer::new(&registry, 1.0);
        frequency.start();

        let check = registry.clone();
        tokio::join!(frame_loop.run(), async {
            sleep(Duration::from_millis(30)).await;
            assert_ok!(handle.clear_all().await);
            sleep(Duration::from_millis(30)).await;
            assert!(check.is_empty());
            assert_ok!(handle.shutdown().await);
        });

        assert!(!frequency.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_token() {
        let cancel_token = CancellationToken::new();
        let (frame_loop, handle) = frame_loop(&cancel_token);
        let registry = frame_loop.registry();

        let stopwatch = StopwatchTimer::new(&registry);
        stopwatch.start();

        let token = cancel_token.clone();
        tokio::join!(frame_loop.run(), async {
            sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        assert!(!stopwatch.is_running());
        assert!(registry.is_empty());

        // The receiver is gone once the loop returns.
        let result = handle.try_shutdown();
        assert!(result.is_err(), "Commands after cancellation should fail");
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_random_rebuilds_registry() {
        let cancel_token = CancellationToken::new();
        let (frame_loop, handle) = frame_loop(&cancel_token);
        let frame_loop = frame_loop.with_random(Rc::new(SeededRandom::new(5)));
        let registry = frame_loop.registry();

        let range = TimeRange::new(0.02, 0.04).unwrap();
        let sporadic = SporadicTimer::new(&registry, range);
        assert_eq!(sporadic.current_frequency(), range.sample(&SeededRandom::new(5)));
        let pulses = Rc::new(Cell::new(0));
        {
            let pulses = Rc::clone(&pulses);
            sporadic.subscribe(TimerEvent::Ticked, move || pulses.set(pulses.get() + 1));
        }
        sporadic.start();

        assert_ok!(handle.try_shutdown());
        let frames = frame_loop.run().await;

        // The command may win the race against the first frame.
        assert!(frames <= 1);
        assert!(!sporadic.is_running());
        assert_eq!(pulses.get(), 0);
    }
}
