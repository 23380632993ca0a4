//! Log sinks that receive conversion log lines as they are produced.
//!
//! A sink may be shared by conversions running on several threads, so every
//! implementation must tolerate concurrent appends.

use std::sync::{Mutex, PoisonError};

/// Receives log lines, in the order each conversion produces them.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn append(&self, _line: &str) {}
}

/// Prints each line to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn append(&self, line: &str) {
        println!("{line}");
    }
}

/// Accumulates lines in memory behind a mutex.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every line appended so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns every line appended so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl LogSink for MemorySink {
    fn append(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}
