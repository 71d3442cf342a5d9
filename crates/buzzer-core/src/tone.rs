use std::sync::Arc;

use crate::error::ToneError;

/// Platform-agnostic tone output.
///
/// `emit` is blocking: it returns once the tone has played for `duration_ms`.
pub trait ToneOutput: Send + Sync {
    fn emit(&self, frequency_hz: f64, duration_ms: f64) -> Result<(), ToneError>;
}

impl<T: ToneOutput + ?Sized> ToneOutput for Arc<T> {
    fn emit(&self, frequency_hz: f64, duration_ms: f64) -> Result<(), ToneError> {
        (**self).emit(frequency_hz, duration_ms)
    }
}
