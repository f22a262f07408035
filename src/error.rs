use thiserror::Error;

/// Errors raised while configuring timers or the frame loop.
///
/// Timer control itself never fails: starting a running timer, stopping a
/// stopped one or looking up a missing lap are all plain no-ops.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TimerError {
    #[error("Invalid time range: min {min} must be finite and not greater than max {max}")]
    InvalidRange { min: f32, max: f32 },

    #[error("Frame interval must be greater than zero")]
    ZeroFrameInterval,

    #[error("Command buffer size must be greater than zero")]
    ZeroBufferSize,
}
