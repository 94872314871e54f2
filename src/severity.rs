//! Severity levels understood by Cloud Logging.
//!
//! Levels are integer-backed and spaced by 100 so new levels can be slotted
//! in without renumbering. The unassigned `DEFAULT` level has no name and is
//! omitted from emitted entries.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::LogError;

/// A log entry severity.
///
/// Ordering follows escalation: `DEFAULT < DEBUG < INFO < ... < EMERGENCY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Severity(i32);

impl Severity {
    /// No assigned severity level.
    pub const DEFAULT: Severity = Severity(0);
    /// Debug or trace information.
    pub const DEBUG: Severity = Severity(100);
    /// Routine information, such as ongoing status or performance.
    pub const INFO: Severity = Severity(200);
    /// Normal but significant events, such as start up, shut down, or configuration.
    pub const NOTICE: Severity = Severity(300);
    /// Events that might cause problems.
    pub const WARNING: Severity = Severity(400);
    /// Events likely to cause problems.
    pub const ERROR: Severity = Severity(500);
    /// Events that cause more severe problems or outages.
    pub const CRITICAL: Severity = Severity(600);
    /// A person must take an action immediately.
    pub const ALERT: Severity = Severity(700);
    /// One or more systems are unusable.
    pub const EMERGENCY: Severity = Severity(800);

    /// Every named level, lowest first.
    pub const ALL: [Severity; 8] = [
        Severity::DEBUG,
        Severity::INFO,
        Severity::NOTICE,
        Severity::WARNING,
        Severity::ERROR,
        Severity::CRITICAL,
        Severity::ALERT,
        Severity::EMERGENCY,
    ];

    /// Wrap a raw value without validating it.
    ///
    /// Unknown values are carried through and simply have no name.
    pub const fn from_raw(value: i32) -> Self {
        Severity(value)
    }

    /// The raw integer value.
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Canonical uppercase name, or `None` for `DEFAULT` and unknown values.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Severity::DEBUG => Some("DEBUG"),
            Severity::INFO => Some("INFO"),
            Severity::NOTICE => Some("NOTICE"),
            Severity::WARNING => Some("WARNING"),
            Severity::ERROR => Some("ERROR"),
            Severity::CRITICAL => Some("CRITICAL"),
            Severity::ALERT => Some("ALERT"),
            Severity::EMERGENCY => Some("EMERGENCY"),
            _ => None,
        }
    }

    /// Whether entries at this level belong on the error stream.
    pub fn is_error(self) -> bool {
        self >= Severity::ERROR
    }

    fn is_known(self) -> bool {
        self == Severity::DEFAULT || self.name().is_some()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if *self == Severity::DEFAULT => f.write_str("DEFAULT"),
            None => write!(f, "INVALID({})", self.0),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_str(name),
            None => Err(serde::ser::Error::custom(format!(
                "severity {} has no serialized name",
                self.0
            ))),
        }
    }
}

impl FromStr for Severity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper == "DEFAULT" {
            return Ok(Severity::DEFAULT);
        }
        Severity::ALL
            .into_iter()
            .find(|sev| sev.name() == Some(upper.as_str()))
            .ok_or_else(|| LogError::InvalidSeverity(s.to_string()))
    }
}

impl TryFrom<i32> for Severity {
    type Error = LogError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let severity = Severity(value);
        if severity.is_known() {
            Ok(severity)
        } else {
            Err(LogError::InvalidSeverity(value.to_string()))
        }
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::DEBUG,
            tracing::Level::INFO => Severity::INFO,
            tracing::Level::WARN => Severity::WARNING,
            tracing::Level::ERROR => Severity::ERROR,
        }
    }
}
