//! Log capture module - prints log messages and keeps the recent warnings.
//!
//! This module implements a custom `log::Log` that prints every enabled record
//! to the console and captures the severe ones (warnings and errors by default)
//! to a shared `LogBuffer`, so they can be repeated once the session is over.

use std::sync::Mutex;

use buzzer_core::log_buffer::{LogBuffer, LogEntry};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Global log buffer for captured warnings and errors.
static LOG_BUFFER: Mutex<LogBuffer> = Mutex::new(LogBuffer::new());

/// Logger that captures to the ring buffer and prints to console.
pub struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        // The log macros have already applied the max level; the buffer
        // applies its own capture level.
        if let Ok(mut buffer) = LOG_BUFFER.lock() {
            let msg = format!("{}", record.args());
            buffer.push(record.level(), &msg);
        }

        let thread = std::thread::current();
        println!(
            "[{:<5}] {} ({}): {}",
            record.level(),
            record.target(),
            thread.name().unwrap_or("?"),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Install the capture logger. Calling it again only changes the levels.
///
/// `max_level` filters what is printed, `capture_level` what is kept for the
/// end-of-session summary.
pub fn init(max_level: LevelFilter, capture_level: Level) {
    // Err means a logger is already set
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(max_level);

    if let Ok(mut buffer) = LOG_BUFFER.lock() {
        buffer.set_max_level(capture_level);
    }
}

/// Get a snapshot of recent captured entries (newest first).
pub fn recent_log_entries(count: usize) -> Vec<LogEntry> {
    LOG_BUFFER
        .lock()
        .ok()
        .map(|buffer| buffer.recent(count).cloned().collect())
        .unwrap_or_default()
}
