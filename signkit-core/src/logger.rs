//! Bridge from the `log` facade to a host-provided logger.
//!
//! The library logs through `log::debug!`/`log::info!` and friends. Hosts
//! that do not install a `log` implementation of their own can hand a
//! [`Logger`] to [`set_logger`] and receive every record as a plain string.
//! Debug and trace records from other crates are dropped.
//!
//! ```rust
//! use std::sync::Arc;
//! use signkit_core::logger::{set_logger, LogLevel, Logger};
//!
//! struct StderrLogger;
//!
//! impl Logger for StderrLogger {
//!     fn log(&self, level: LogLevel, message: String) {
//!         eprintln!("[{level:?}] {message}");
//!     }
//! }
//!
//! set_logger(Arc::new(StderrLogger));
//! ```

use std::sync::{Arc, OnceLock};

/// Receiver of log records.
pub trait Logger: Sync + Send {
    /// Handles one formatted record.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Very detailed tracing.
    Trace,
    /// Debugging information.
    Debug,
    /// Normal progress, e.g. a profile being stored or locked.
    Info,
    /// Something unexpected that did not stop the operation.
    Warn,
    /// A failed operation.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

const CRATE_PREFIX: &str = "signkit";

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info || metadata.target().starts_with(CRATE_PREFIX)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Installs `logger` as the process-wide receiver of log records.
///
/// Only the first call has an effect. Returns `false` if a logger was
/// already set, here or through another `log` implementation.
pub fn set_logger(logger: Arc<dyn Logger>) -> bool {
    if LOGGER_INSTANCE.set(logger).is_err() {
        return false;
    }

    static FORWARDER: ForeignLogger = ForeignLogger;
    match log::set_logger(&FORWARDER) {
        Ok(()) => {
            log::set_max_level(log::LevelFilter::Trace);
            true
        }
        Err(err) => {
            eprintln!("failed to install signkit logger: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Collecting(Mutex<Vec<(LogLevel, String)>>);

    impl Logger for Collecting {
        fn log(&self, level: LogLevel, message: String) {
            self.0
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push((level, message));
        }
    }

    #[test]
    fn test_forwards_records_and_filters_foreign_debug() {
        let collecting = Arc::new(Collecting::default());
        assert!(set_logger(collecting.clone()));
        assert!(!set_logger(Arc::new(Collecting::default())));

        log::debug!("from signkit");
        log::debug!(target: "hyper", "foreign debug");

        let records = collecting.0.lock().expect("lock");
        assert!(records
            .iter()
            .any(|(level, message)| *level == LogLevel::Debug && message == "from signkit"));
        assert!(!records.iter().any(|(_, message)| message == "foreign debug"));
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::from(log::Level::Warn), LogLevel::Warn);
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Trace);
    }
}
