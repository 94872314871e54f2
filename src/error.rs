//! Error types for cloudlog.
//!
//! Logging calls never fail; these errors only come out of the strict
//! paths: loading configuration, installing globals and parsing levels.

use thiserror::Error;

/// Unified error type for cloudlog setup operations.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Global logging configuration is already initialized")]
    AlreadyInitialized,

    #[error("Invalid severity: {0}")]
    InvalidSeverity(String),

    #[error("Subscriber error: {0}")]
    Subscriber(String),
}

/// Result type alias for cloudlog operations.
pub type LogResult<T> = Result<T, LogError>;

/// Unwind payload raised by the `panic` family of logging calls.
///
/// The CRITICAL entry is written before the unwind starts, so anything
/// recovering this value with `catch_unwind` can rely on the line being out.
///
/// The payload is not a string. The default panic hook therefore reports it
/// as `Box<dyn Any>`; the text lives in the logged entry and in
/// [`CriticalFault::message`]. Downcast the payload to read it:
///
/// ```rust,ignore
/// let fault = std::panic::catch_unwind(|| cloudlog::panic("disk full")).unwrap_err();
/// assert_eq!(fault.downcast_ref::<CriticalFault>().unwrap().message(), "disk full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CriticalFault {
    message: String,
}

impl CriticalFault {
    pub(crate) fn new(message: String) -> Self {
        Self { message }
    }

    /// The formatted message text that was logged.
    pub fn message(&self) -> &str {
        &self.message
    }
}
