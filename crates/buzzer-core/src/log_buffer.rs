//! Log Buffer - ring buffer of recent warnings and errors
//!
//! Fixed-size storage so a long buzzer session cannot grow it. The desktop
//! logger pushes into it and prints what is left at exit.

use heapless::Deque;
use log::Level;

/// Maximum number of log lines kept
pub const LOG_BUFFER_CAPACITY: usize = 16;

/// Maximum length of a single log line
pub const LOG_LINE_MAX_LEN: usize = 96;

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: Level,
    /// Truncated to `LOG_LINE_MAX_LEN - 1` characters
    pub message: heapless::String<LOG_LINE_MAX_LEN>,
}

impl LogEntry {
    pub fn new(level: Level, message: &str) -> Self {
        let mut msg = heapless::String::new();
        for c in message.chars().take(LOG_LINE_MAX_LEN - 1) {
            // multi-byte chars can still overflow the byte capacity
            if msg.push(c).is_err() {
                break;
            }
        }
        Self {
            level,
            message: msg,
        }
    }
}

pub struct LogBuffer {
    entries: Deque<LogEntry, LOG_BUFFER_CAPACITY>,
    /// Least severe level that is still captured
    max_level: Level,
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            max_level: Level::Warn,
        }
    }

    /// Capture `level` and everything more severe.
    pub fn set_max_level(&mut self, level: Level) {
        self.max_level = level;
    }

    pub fn max_level(&self) -> Level {
        self.max_level
    }

    /// Push a log line, evicting the oldest one when full
    pub fn push(&mut self, level: Level, message: &str) {
        if level > self.max_level {
            return;
        }

        if self.entries.is_full() {
            self.entries.pop_front();
        }
        let _ = self.entries.push_back(LogEntry::new(level, message));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev().take(count)
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}
