//! Injected logging capability.
//!
//! Components receive an `Arc<dyn Logger>` at construction instead of
//! reaching for a process-wide logger. The default [`TracingLogger`] forwards
//! everything to `tracing`; installing a subscriber is left to the application.

use std::sync::Arc;

use tracing::Level;

pub trait Logger: Send + Sync + std::fmt::Debug {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// Forwards to `tracing` events carrying a `component` field.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("inscription_sdk")
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(component = self.component, "{}", message),
            Level::WARN => tracing::warn!(component = self.component, "{}", message),
            Level::INFO => tracing::info!(component = self.component, "{}", message),
            Level::DEBUG => tracing::debug!(component = self.component, "{}", message),
            _ => tracing::trace!(component = self.component, "{}", message),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger::default())
}
