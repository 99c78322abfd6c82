/*
 * uioctl Logging System
 *
 * Backend for the `log` facade. Diagnostic messages go to stderr as
 * `[LEVEL] message` lines so they never interleave with register values or
 * interrupt lines on stdout.
 *
 * The level comes from the `-v` count on the command line unless the
 * UIOCTL_LOG environment variable names one explicitly.
 */

use std::io::Write;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// Environment variable that overrides the log level
pub const LOG_ENV: &str = "UIOCTL_LOG";

/// Logger writing to stderr.
struct UioLogger;

impl log::Log for UioLogger {
    /// Checks if the given log level is enabled.
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    /// Logs the record by printing it to stderr.
    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr().lock(), "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// The UioLogger instance used for logging.
static LOGGER: UioLogger = UioLogger;

/// Pick the log level from `-v` occurrences and an optional override.
///
/// Unknown override values are ignored.
pub fn level_for(verbosity: u8, env_override: Option<&str>) -> LevelFilter {
    if let Some(level) = env_override.and_then(|v| v.trim().parse::<LevelFilter>().ok()) {
        return level;
    }

    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the logger at `level`.
///
/// Fails only if another logger was already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
