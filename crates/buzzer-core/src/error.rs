use thiserror::Error;

/// Failures reported by a [`ToneOutput`](crate::tone::ToneOutput) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToneError {
    /// No audio output could be opened
    #[error("audio device not available: {0}")]
    DeviceUnavailable(String),

    /// The backend accepted the tone but could not play it
    #[error("playback failed: {0}")]
    Playback(String),
}

#[derive(Error, Debug)]
pub enum EmitterError {
    #[error("buzzer is already playing")]
    AlreadyPlaying,

    /// The last run was stopped but its worker is still inside a burst
    #[error("buzzer is still finishing its last burst")]
    StillStopping,

    #[error("tone output failed: {0}")]
    Tone(#[from] ToneError),

    #[error("buzzer worker panicked")]
    WorkerPanicked,

    #[error("failed to spawn buzzer worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Raised inside the worker when its pause is cut short by `stop`.
///
/// Never leaves the worker; it only ends the playback loop.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cancellation requested")]
pub struct CancellationRequested;
