//! Integration with the `log` crate.
//!
//! When enabled (via the `log` feature), this module provides a logger that
//! prints each record above the bar block through the registry's stream. The
//! block is pushed down and redrawn under the registry lock, so a log line
//! never lands inside a bar's cursor sequence or on a bar's row.
//!
//! # Example
//!
//! ```rust,ignore
//! use stackbar::progress::{ProgressBar, init_log_integration};
//! use log::info;
//!
//! init_log_integration();
//!
//! let bar = ProgressBar::builder(100).prefix("Work:").build()?;
//! info!("Starting processing");
//! bar.update(100)?;
//! ```

use std::sync::Arc;

use console::style;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use super::registry::Registry;

/// A logger that serializes its output with bar redraws.
pub struct ProgressLogger {
    level: LevelFilter,
    target_filter: Option<String>,
    registry: Arc<Registry>,
}

impl ProgressLogger {
    /// Creates a logger synchronized with [`Registry::global`].
    ///
    /// # Arguments
    ///
    /// * `level` - The maximum log level to display
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            target_filter: None,
            registry: Registry::global(),
        }
    }

    /// Only show records whose target starts with `target`.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_filter = Some(target.into());
        self
    }

    /// Synchronizes with `registry` instead of the global one.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Installs this logger as the global logger.
    ///
    /// # Errors
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        // Set logger first to avoid modifying max level if logger installation fails
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn format_message(&self, record: &Record) -> String {
        let level_str = match record.level() {
            Level::Error => style("ERROR").for_stdout().red(),
            Level::Warn => style("WARN").for_stdout().yellow(),
            Level::Info => style("INFO").for_stdout().cyan(),
            Level::Debug => style("DEBUG").for_stdout().dim(),
            Level::Trace => style("TRACE").for_stdout().dim(),
        };
        format!("{} {}", level_str, record.args())
    }
}

impl Log for ProgressLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        match self.target_filter {
            Some(ref filter) => metadata.target().starts_with(filter),
            None => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = self.format_message(record);
        let _ = self.registry.write_above(&message);
    }

    fn flush(&self) {}
}

/// Initializes the progress-aware logger with the default log level (Info).
///
/// # Panics
///
/// Panics if a logger has already been initialized.
pub fn init_log_integration() {
    ProgressLogger::new(LevelFilter::Info)
        .init()
        .expect("Failed to initialize logger - another logger may already be set");
}

/// Initializes the progress-aware logger with a custom log level.
///
/// # Panics
///
/// Panics if a logger has already been initialized.
pub fn init_log_integration_with_level(level: LevelFilter) {
    ProgressLogger::new(level)
        .init()
        .expect("Failed to initialize logger - another logger may already be set");
}

/// Tries to initialize the progress-aware logger, returning an error on failure.
///
/// # Errors
///
/// Returns an error if a logger has already been set.
pub fn try_init_log_integration() -> Result<(), SetLoggerError> {
    ProgressLogger::new(LevelFilter::Info).init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn take(&self) -> String {
            String::from_utf8(std::mem::take(&mut *self.0.lock().unwrap())).unwrap()
        }
    }

    fn logger() -> ProgressLogger {
        ProgressLogger::new(LevelFilter::Info)
            .with_registry(Arc::new(Registry::new(std::io::sink(), 80)))
    }

    #[test]
    fn test_enabled_respects_level() {
        let logger = logger();
        let info = Metadata::builder().level(Level::Info).target("app").build();
        let debug = Metadata::builder().level(Level::Debug).target("app").build();
        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn test_enabled_respects_target() {
        let logger = logger().with_target("app::worker");
        let hit = Metadata::builder()
            .level(Level::Warn)
            .target("app::worker::fetch")
            .build();
        let miss = Metadata::builder().level(Level::Warn).target("other").build();
        assert!(logger.enabled(&hit));
        assert!(!logger.enabled(&miss));
    }

    #[test]
    fn test_format_message_contains_text() {
        let logger = logger();
        let message = logger.format_message(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("disk almost full"))
                .build(),
        );
        assert!(message.contains("WARN"));
        assert!(message.ends_with(" disk almost full"));
    }

    #[test]
    fn test_log_record_is_printed_above_bars() {
        use crate::progress::{Backend, ProgressBar};
        use std::time::Duration;

        let out = Capture::default();
        let registry = Arc::new(Registry::new(out.clone(), 80));
        let bar = ProgressBar::builder(10)
            .prefix("Work:")
            .backend(Backend::Terminal)
            .registry(registry.clone())
            .minimum_interval(Duration::ZERO)
            .build()
            .unwrap();
        bar.update(1).unwrap();
        let drawn = out.take();
        let line = drawn
            .strip_prefix("\n\x1b7\x1b[1A\r")
            .and_then(|s| s.strip_suffix("\x1b8"))
            .unwrap()
            .to_string();

        let logger = ProgressLogger::new(LevelFilter::Info).with_registry(registry);
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("disk almost full"))
                .build(),
        );

        let written = out.take();
        assert!(written.starts_with("\x1b[1A\r"), "got {written:?}");
        let (record, block) = written["\x1b[1A\r".len()..].split_once("\x1b[K\n").unwrap();
        assert!(record.ends_with(" disk almost full"));
        assert_eq!(block, format!("{line}\n"));

        // Distances are unchanged after the shift.
        bar.update(1).unwrap();
        assert!(out.take().starts_with("\x1b7\x1b[1A\rWork: |"));
    }

    #[test]
    fn test_disabled_record_writes_nothing() {
        let out = Capture::default();
        let registry = Arc::new(Registry::new(out.clone(), 80));
        let logger = ProgressLogger::new(LevelFilter::Warn).with_registry(registry);
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("quiet"))
                .build(),
        );
        assert_eq!(out.take(), "");
    }
}
