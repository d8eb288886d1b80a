//! Injected logging seam.
//!
//! Each component here takes a `Logger` handle at construction, defaulting
//! to [`NoopLogger`], rather than leaning on a process-wide logger
//! singleton, so the core never owns global mutable state.

use crate::error::FlightCoreError;

/// Severity of a log record emitted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Logging seam implemented by the host. `error` is called for every
/// surfaced [`FlightCoreError`]; `record` is available for informational
/// events (trim begin/end, gust trigger, IC reset).
pub trait Logger: Send + Sync {
    fn record(&self, level: Level, message: &str);

    fn error(&self, err: &FlightCoreError) {
        self.record(Level::Error, &err.to_string());
    }
}

/// Default logger: discards everything. Used when a host does not care to
/// wire up diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn record(&self, _level: Level, _message: &str) {}
}

/// Logger backed by the `tracing` crate's global dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn record(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!("{message}"),
            Level::Warn => tracing::warn!("{message}"),
            Level::Error => tracing::error!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_logger_never_panics() {
        let logger = NoopLogger;
        logger.record(Level::Info, "hello");
        logger.error(&FlightCoreError::BadUnit("FOO".into()));
    }
}
