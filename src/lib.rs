//! cloudlog - severity-tagged JSON logging for Google Cloud Run, App Engine
//! and Cloud Functions.
//!
//! Every call writes one JSON object per line. Entries below ERROR go to
//! stdout, ERROR and above to stderr, and Cloud Logging picks up the
//! `severity` field to color and filter them. Request-scoped loggers attach
//! the `logging.googleapis.com/trace` field from `X-Cloud-Trace-Context`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cloudlog::{LogConfig, Logger, Severity};
//!
//! cloudlog::global::init(LogConfig::load()?)?;
//!
//! cloudlog::print("Test");                         // {"message":"Test"}
//! cloudlog::infof(format_args!("Hello {:?}!", "Google"));
//! cloudlog::noticej("job done", &job);             // job's fields merged in
//!
//! let logger = cloudlog::global::for_request(&request);
//! logger.warning("retrying");
//! ```

pub mod config;
pub mod entry;
pub mod error;
mod extract;
pub mod global;
mod layer;
mod logger;
pub mod severity;
mod surface;
pub mod trace;

pub use config::LogConfig;
pub use error::{CriticalFault, LogError, LogResult};
pub use extract::RequestLogger;
pub use layer::{init_tracing, CloudLoggingLayer};
pub use logger::Logger;
pub use severity::Severity;
pub use surface::*;
pub use trace::{HeaderSource, TraceId, TRACE_HEADER};
