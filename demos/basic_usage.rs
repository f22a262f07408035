//! Basic usage example for frame timers

use std::rc::Rc;

use frame_timers::{
    CancellationToken, CountdownTimer, Duration, FrameLoop, FrequencyTimer, SporadicTimer,
    StopwatchTimer, TimeRange, TimerEvent,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let cancel_token = CancellationToken::new();

    // Create the frame loop at roughly 60 frames per second
    let (frame_loop, handle) = FrameLoop::new(
        "example_frame_loop".to_string(),
        Duration::from_millis(16), // frame interval
        16,                        // command buffer size
        cancel_token.clone(),
    )?;
    let registry = frame_loop.registry();

    let countdown = CountdownTimer::new(&registry, 1.0);
    countdown.subscribe(TimerEvent::Stopped, || println!("Countdown finished!"));

    let heartbeat = FrequencyTimer::new(&registry, 0.25);
    heartbeat.subscribe(TimerEvent::Ticked, || println!("Heartbeat"));

    let sporadic = SporadicTimer::new(&registry, TimeRange::new(0.1, 0.6)?);
    sporadic.subscribe(TimerEvent::Ticked, || println!("Something happened"));

    let stopwatch = Rc::new(StopwatchTimer::new(&registry));
    {
        let stopwatch = Rc::clone(&stopwatch);
        heartbeat.subscribe(TimerEvent::Ticked, move || {
            if let Some(lap) = stopwatch.add_lap() {
                println!("{}", lap);
            }
        });
    }

    countdown.start();
    heartbeat.start();
    sporadic.start();
    stopwatch.start();

    println!("Timers started! Running for two seconds...");

    let (frames, result) = tokio::join!(frame_loop.run(), async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.shutdown().await
    });
    result?;

    println!(
        "Frame loop shut down after {} frames, stopwatch at {:.2}s with {} laps",
        frames,
        stopwatch.current_time(),
        stopwatch.lap_count()
    );
    Ok(())
}
