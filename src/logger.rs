//! Logger handles and the writer router.
//!
//! A `Logger` carries an optional trace id and an optional pair of output
//! streams. Entries at ERROR and above go to the error stream, everything
//! else to the normal stream. Each write is serialized by a per-instance
//! lock held across encoding and flushing, so concurrent callers sharing a
//! `Logger` never interleave partial lines.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::config::LogConfig;
use crate::entry;
use crate::error::CriticalFault;
use crate::severity::Severity;
use crate::trace::{self, HeaderSource, TraceId};

type BoxedWriter = Box<dyn Write + Send>;

/// Where a logger's entries end up.
enum Sink {
    /// Process stdout / stderr.
    Std,
    /// Caller-supplied streams. `error: None` shares `normal` for every level.
    Custom {
        normal: BoxedWriter,
        error: Option<BoxedWriter>,
    },
}

impl Sink {
    fn write_line(&mut self, severity: Severity, line: &[u8]) {
        // Best-effort: a broken sink must never take the application down.
        let _ = match self {
            Sink::Std if severity.is_error() => write_flush(&mut io::stderr().lock(), line),
            Sink::Std => write_flush(&mut io::stdout().lock(), line),
            Sink::Custom {
                error: Some(error), ..
            } if severity.is_error() => write_flush(error, line),
            Sink::Custom { normal, .. } => write_flush(normal, line),
        };
    }
}

fn write_flush<W: Write + ?Sized>(w: &mut W, line: &[u8]) -> io::Result<()> {
    w.write_all(line)?;
    w.flush()
}

/// A structured logger.
pub struct Logger {
    trace: Option<TraceId>,
    sink: Mutex<Sink>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            trace: None,
            sink: Mutex::new(Sink::Std),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("trace", &self.trace).finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a logger that writes every entry, whatever its severity, to `writer`.
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            trace: None,
            sink: Mutex::new(Sink::Custom {
                normal: Box::new(writer),
                error: None,
            }),
        }
    }

    /// Create a logger with separate streams for normal and error-ish entries.
    pub fn with_writers<N, E>(normal: N, error: E) -> Self
    where
        N: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Self {
            trace: None,
            sink: Mutex::new(Sink::Custom {
                normal: Box::new(normal),
                error: Some(Box::new(error)),
            }),
        }
    }

    /// Create a request-scoped logger on stdout/stderr.
    ///
    /// The trace id is taken from `X-Cloud-Trace-Context` when the config
    /// names a project; otherwise the logger carries no trace.
    pub fn for_request(config: &LogConfig, headers: &impl HeaderSource) -> Self {
        Self {
            trace: trace::trace_from_headers(config.project_id(), headers),
            ..Self::default()
        }
    }

    /// Attach a trace id to this logger.
    pub fn with_trace(mut self, trace: TraceId) -> Self {
        self.trace = Some(trace);
        self
    }

    /// The trace id attached to this logger, if any.
    pub fn trace(&self) -> Option<&TraceId> {
        self.trace.as_ref()
    }

    /// Emit a message-only entry.
    pub fn log(&self, severity: Severity, message: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let line = entry::format_plain(severity, self.trace.as_ref(), message);
        sink.write_line(severity, &line);
    }

    /// Emit an entry whose fields are merged with `payload`.
    pub fn log_json<T>(&self, severity: Severity, message: &str, payload: &T)
    where
        T: Serialize + ?Sized,
    {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let line = entry::format_structured(severity, self.trace.as_ref(), message, payload);
        sink.write_line(severity, &line);
    }

    /// Log `message` at CRITICAL, then exit the process with status 1.
    pub fn exit_with_message(&self, message: String) -> ! {
        self.log(Severity::CRITICAL, &message);
        std::process::exit(1)
    }

    /// Log `message` with `payload` at CRITICAL, then exit the process with status 1.
    pub fn exit_with_json<T>(&self, message: String, payload: &T) -> !
    where
        T: Serialize + ?Sized,
    {
        self.log_json(Severity::CRITICAL, &message, payload);
        std::process::exit(1)
    }

    /// Log `message` at CRITICAL, then unwind with a [`CriticalFault`].
    pub fn panic_message(&self, message: String) -> ! {
        self.log(Severity::CRITICAL, &message);
        std::panic::panic_any(CriticalFault::new(message))
    }

    /// Log `message` with `payload` at CRITICAL, then unwind with a [`CriticalFault`].
    pub fn panic_json<T>(&self, message: String, payload: &T) -> !
    where
        T: Serialize + ?Sized,
    {
        self.log_json(Severity::CRITICAL, &message, payload);
        std::panic::panic_any(CriticalFault::new(message))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    /// Cloneable in-memory writer for inspecting logger output.
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }

        pub fn lines(&self) -> Vec<String> {
            self.contents().lines().map(str::to_string).collect()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer that always fails.
    pub struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }
}
