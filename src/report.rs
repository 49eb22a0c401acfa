//! Leveled message sink handed explicitly to operations that report per-item outcomes.
//!
//! Library code never reaches for a global logger: operations that must keep going
//! after a failure (the batch driver, unknown-file scans) take a `&dyn Reporter`.

use std::fmt;
use std::sync::Mutex;

use tracing::Level;

/// Accepts leveled, formatted messages. Implementations must not block for long.
pub trait Reporter {
    fn report(&self, level: Level, args: fmt::Arguments<'_>);

    fn info(&self, args: fmt::Arguments<'_>) {
        self.report(Level::INFO, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.report(Level::WARN, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.report(Level::ERROR, args);
    }
}

/// Forwards every message to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, args: fmt::Arguments<'_>) {
        if level == Level::ERROR {
            tracing::error!("{}", args);
        } else if level == Level::WARN {
            tracing::warn!("{}", args);
        } else if level == Level::INFO {
            tracing::info!("{}", args);
        } else if level == Level::DEBUG {
            tracing::debug!("{}", args);
        } else {
            tracing::trace!("{}", args);
        }
    }
}

/// Keeps messages in memory; handy for callers that want to inspect or summarize them.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages in arrival order.
    pub fn messages(&self) -> Vec<(Level, String)> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, level: Level) -> usize {
        self.messages().iter().filter(|(l, _)| *l == level).count()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, level: Level, args: fmt::Arguments<'_>) {
        let line = args.to_string();
        match self.messages.lock() {
            Ok(mut guard) => guard.push((level, line)),
            Err(poisoned) => poisoned.into_inner().push((level, line)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_reporter_keeps_levels_and_order() {
        let rec = RecordingReporter::new();
        rec.info(format_args!("first {}", 1));
        rec.error(format_args!("second"));
        rec.warn(format_args!("third"));

        let msgs = rec.messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0], (Level::INFO, "first 1".to_string()));
        assert_eq!(msgs[1].0, Level::ERROR);
        assert_eq!(rec.count(Level::WARN), 1);
    }

    #[test]
    fn tracing_reporter_accepts_every_level() {
        // No subscriber installed: events are dropped, this only checks nothing panics.
        let r = TracingReporter;
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            r.report(level, format_args!("level {}", level));
        }
    }
}
