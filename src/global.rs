//! Process-wide defaults.
//!
//! The configuration snapshot is set at most once, either explicitly with
//! [`init`] at startup or lazily from the environment on first use. The
//! default logger writes to stdout/stderr and carries no trace.

use std::sync::OnceLock;

use crate::config::LogConfig;
use crate::error::{LogError, LogResult};
use crate::logger::Logger;
use crate::trace::HeaderSource;

static CONFIG: OnceLock<LogConfig> = OnceLock::new();
static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Install the process-wide configuration.
///
/// # Errors
///
/// Returns [`LogError::AlreadyInitialized`] if a configuration is already in
/// place, including one loaded lazily by an earlier [`config`] call.
pub fn init(config: LogConfig) -> LogResult<()> {
    CONFIG.set(config).map_err(|_| LogError::AlreadyInitialized)
}

/// The process-wide configuration snapshot.
pub fn config() -> &'static LogConfig {
    CONFIG.get_or_init(LogConfig::from_env)
}

/// The process-wide default logger.
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(Logger::default)
}

/// Build a request-scoped logger using the process-wide configuration.
pub fn for_request(headers: &impl HeaderSource) -> Logger {
    Logger::for_request(config(), headers)
}
