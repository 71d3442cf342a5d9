use crate::consts;

/// Timing of a continuous buzzer run.
///
/// Values are taken as-is, nothing is clamped. A run reads its own copy, so
/// changing the config of a playing buzzer only affects the next `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterConfig {
    /// How long each burst lasts in milliseconds.
    pub burst_duration_ms: f64,
    /// How long the buzzer stays silent between bursts in milliseconds.
    pub pause_duration_ms: u32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            burst_duration_ms: consts::DEFAULT_BURST_DURATION_MS,
            pause_duration_ms: consts::DEFAULT_PAUSE_DURATION_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EmitterConfig::default();
        assert_eq!(config.burst_duration_ms, 5.0);
        assert_eq!(config.pause_duration_ms, 1);
    }
}
