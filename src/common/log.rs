//! Diagnostic sinks and the `log` bridge onto them.
//!
//! The host exposes two text channels: an informational one and an error one.
//! The core writes human readable lines to them and never inspects a result.
//! Internal tracing goes through the `log` facade and only ever lands on the
//! informational channel, so the error channel carries exactly the errors the
//! dispatcher reports.

use log::{LevelFilter, Log, Metadata, Record};

/// Output channels of the host.
pub trait Diagnostics {
    fn display(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// `log::Log` implementation writing enabled records to a display sink.
pub struct HostLogger {
    sink: fn(&str),
    level: LevelFilter,
}

impl HostLogger {
    pub fn new(sink: fn(&str), level: LevelFilter) -> Self {
        Self { sink, level }
    }

    /// Install as the process logger. Only the first call wins; later calls
    /// leave the already registered logger in place.
    pub fn install(self) {
        let level = self.level;
        if log::set_boxed_logger(Box::new(self)).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl Log for HostLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            (self.sink)(&format_line(record));
        }
    }

    fn flush(&self) {}
}

fn format_line(record: &Record<'_>) -> String {
    format!(
        "{} [{}] {}\n",
        record.level().as_str().to_ascii_lowercase(),
        record.target(),
        record.args()
    )
}
