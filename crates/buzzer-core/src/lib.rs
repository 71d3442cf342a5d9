pub mod config;
pub mod consts;
pub mod emitter;
pub mod error;
pub mod log_buffer;
pub mod tone;

pub use config::EmitterConfig;
pub use emitter::ContinuousBuzzer;
pub use error::{EmitterError, ToneError};
pub use tone::ToneOutput;
