//! Host-settable event logging.
//!
//! The SDK stays silent by default; hosts opt into verbose logging with
//! [`LogsMode::Verbose`], after which messages are routed to `tracing`.

use std::sync::atomic::{AtomicBool, Ordering};

/// Logging mode selectable by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogsMode {
    Disabled,
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogLevel {
    Error,
    Info,
    Debug,
}

/// Mode-gated bridge to the `tracing` macros.
#[derive(Debug, Default)]
pub struct EventLogger {
    verbose: AtomicBool,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&self, mode: LogsMode) {
        self.verbose
            .store(mode == LogsMode::Verbose, Ordering::Relaxed);
    }

    pub fn mode(&self) -> LogsMode {
        if self.verbose.load(Ordering::Relaxed) {
            LogsMode::Verbose
        } else {
            LogsMode::Disabled
        }
    }

    pub(crate) fn log(&self, level: LogLevel, message: &str) {
        if !self.verbose.load(Ordering::Relaxed) {
            return;
        }
        match level {
            LogLevel::Error => tracing::error!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Debug => tracing::debug!("{message}"),
        }
    }

    pub(crate) fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub(crate) fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub(crate) fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let logger = EventLogger::new();
        assert_eq!(logger.mode(), LogsMode::Disabled);
    }

    #[test]
    fn mode_round_trips() {
        let logger = EventLogger::new();
        logger.set_mode(LogsMode::Verbose);
        assert_eq!(logger.mode(), LogsMode::Verbose);
        logger.set_mode(LogsMode::Disabled);
        assert_eq!(logger.mode(), LogsMode::Disabled);
    }
}
