/// Length of each tone burst before the buzzer pauses.
pub const DEFAULT_BURST_DURATION_MS: f64 = 5.0;

/// Pause between two bursts.
pub const DEFAULT_PAUSE_DURATION_MS: u32 = 1;

/// Tone used by the signal sampler when nothing else is configured.
pub const DEFAULT_FREQUENCY_HZ: f64 = 10_000.0;

pub const WORKER_THREAD_NAME: &str = "buzzer";
