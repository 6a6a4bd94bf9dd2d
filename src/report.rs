//! Reporting collaborator for user-visible log lines.
//!
//! Components that surface warnings or progress to the operator take an
//! `&dyn Reporter` instead of writing to the global subscriber directly, so
//! the messages can be asserted on in tests.

use std::sync::Mutex;

/// Sink for operator-facing messages.
pub trait Reporter: Send + Sync {
    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
}

/// Forwards every message to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn debug(&self, msg: &str) {
        tracing::debug!("{}", msg);
    }

    fn info(&self, msg: &str) {
        tracing::info!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{}", msg);
    }
}

/// Level of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages, oldest first.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg)
            .collect()
    }

    fn record(&self, level: Level, msg: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((level, msg.to_string()));
        }
    }
}

impl Reporter for MemoryReporter {
    fn debug(&self, msg: &str) {
        self.record(Level::Debug, msg);
    }

    fn info(&self, msg: &str) {
        self.record(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.record(Level::Warn, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_levels() {
        let reporter = MemoryReporter::new();
        reporter.info("starting");
        reporter.warn("bad token");
        reporter.debug("detail");

        assert_eq!(reporter.entries().len(), 3);
        assert_eq!(reporter.messages(Level::Warn), vec!["bad token".to_string()]);
        assert!(reporter.messages(Level::Info)[0].contains("starting"));
    }
}
