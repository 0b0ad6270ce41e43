//! Stdout logger for the demo binary.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes every enabled record to stdout as `LEVEL [target] message`.
pub struct StdoutLogger {
    max_level: LevelFilter,
}

static LOGGER: StdoutLogger = StdoutLogger {
    max_level: LevelFilter::Debug,
};

impl StdoutLogger {
    /// Install the logger as the global facade sink.
    pub fn install() -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(LOGGER.max_level);
        Ok(())
    }
}

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        println!("{tag} [{}] {}", record.target(), record.args());
    }

    fn flush(&self) {}
}
