//! The injected log sink seam and its in-process implementations.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::logger::jsonl::{EventType, LogEntry};

/// Destination for engine log entries, handed to the engine at construction.
pub trait LogSink: Send {
    fn record(&mut self, entry: &LogEntry);

    fn flush(&mut self) {}
}

/// Drops everything. The engine's default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn record(&mut self, _entry: &LogEntry) {}
}

/// Writes one JSON line per entry to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn record(&mut self, entry: &LogEntry) {
        if let Ok(json) = serde_json::to_string(entry) {
            let _ = writeln!(io::stderr(), "[EMU] {json}");
        }
    }
}

/// Cloneable in-memory buffer; clones share the same entries.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Event types in recording order.
    #[must_use]
    pub fn events(&self) -> Vec<EventType> {
        self.entries.lock().iter().map(|entry| entry.event).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn record(&mut self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::jsonl::Severity;

    #[test]
    fn memory_sink_clones_share_entries() {
        let observer = MemorySink::new();
        let mut writer = observer.clone();
        writer.record(&LogEntry::new(EventType::Invoked, Severity::Debug));
        writer.record(&LogEntry::new(EventType::Reset, Severity::Info));

        assert_eq!(observer.len(), 2);
        assert_eq!(observer.events(), vec![EventType::Invoked, EventType::Reset]);

        observer.clear();
        assert!(writer.is_empty());
    }

    #[test]
    fn null_sink_accepts_anything() {
        let mut sink = NullSink;
        sink.record(&LogEntry::new(EventType::Invoked, Severity::Debug));
        sink.flush();
    }
}
