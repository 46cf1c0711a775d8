// In-memory log capture for TUI mode.
//
// While the dashboard owns the alternate screen, anything written to stdout
// or stderr would garble the display. This layer captures tracing records
// into a bounded ring buffer instead; warnings and errors are dumped to
// stderr after the terminal is restored.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Ring buffer capacity; oldest entries fall off first.
const LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
}

/// Shared, bounded buffer of captured log entries.
#[derive(Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() >= LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Warnings and errors, oldest first, for the post-exit dump.
    pub fn warnings(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level <= Level::WARN)
            .cloned()
            .collect()
    }
}

/// Tracing layer that redirects records into a LogBuffer.
pub struct CaptureLayer {
    buffer: LogBuffer,
}

impl CaptureLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));

        self.buffer.push(LogEntry {
            timestamp: Utc::now(),
            level: *event.metadata().level(),
            message,
        });
    }
}

/// Extracts the `message` field from a tracing event.
struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
            // Strip the quotes Debug adds around strings
            if self.0.starts_with('"') && self.0.ends_with('"') {
                *self.0 = self.0[1..self.0.len() - 1].to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_bounded() {
        let buffer = LogBuffer::new();
        for i in 0..(LOG_CAPACITY + 10) {
            buffer.push(LogEntry {
                timestamp: Utc::now(),
                level: Level::WARN,
                message: format!("entry {i}"),
            });
        }
        let entries = buffer.warnings();
        assert_eq!(entries.len(), LOG_CAPACITY);
        assert_eq!(entries[0].message, "entry 10");
    }

    #[test]
    fn warnings_skip_info_entries() {
        let buffer = LogBuffer::new();
        buffer.push(LogEntry {
            timestamp: Utc::now(),
            level: Level::WARN,
            message: "request failed".into(),
        });
        buffer.push(LogEntry {
            timestamp: Utc::now(),
            level: Level::INFO,
            message: "retrying".into(),
        });
        let warnings = buffer.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "request failed");
    }
}
