//! Per-severity call surface.
//!
//! Every level gets four shapes: `x` (display a value), `xln` (display a
//! value followed by a newline), `xf` (pre-built `format_args!`) and `xj`
//! (message plus structured payload). They exist both as `Logger` methods
//! and as free functions on the process-wide default logger. All of them
//! funnel into [`Logger::log`] and [`Logger::log_json`].

use std::fmt;

use serde::Serialize;

use crate::global;
use crate::logger::Logger;
use crate::severity::Severity;

impl Logger {
    /// Emit a pre-formatted message, avoiding an allocation for static text.
    pub fn log_fmt(&self, severity: Severity, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(message) => self.log(severity, message),
            None => self.log(severity, &args.to_string()),
        }
    }
}

macro_rules! severity_surface {
    ($($severity:ident => $plain:ident, $ln:ident, $f:ident, $j:ident, $doc:literal;)*) => {
        impl Logger {
            $(
                #[doc = $doc]
                pub fn $plain(&self, message: impl fmt::Display) {
                    self.log_fmt(Severity::$severity, format_args!("{}", message));
                }

                #[doc = $doc]
                ///
                /// A trailing newline is appended to the message.
                pub fn $ln(&self, message: impl fmt::Display) {
                    self.log_fmt(Severity::$severity, format_args!("{}\n", message));
                }

                #[doc = $doc]
                pub fn $f(&self, args: fmt::Arguments<'_>) {
                    self.log_fmt(Severity::$severity, args);
                }

                #[doc = $doc]
                ///
                /// The payload's fields become top-level fields of the entry.
                pub fn $j<T: Serialize + ?Sized>(&self, message: &str, payload: &T) {
                    self.log_json(Severity::$severity, message, payload);
                }
            )*
        }

        $(
            #[doc = $doc]
            pub fn $plain(message: impl fmt::Display) {
                global::logger().$plain(message);
            }

            #[doc = $doc]
            ///
            /// A trailing newline is appended to the message.
            pub fn $ln(message: impl fmt::Display) {
                global::logger().$ln(message);
            }

            #[doc = $doc]
            pub fn $f(args: fmt::Arguments<'_>) {
                global::logger().$f(args);
            }

            #[doc = $doc]
            ///
            /// The payload's fields become top-level fields of the entry.
            pub fn $j<T: Serialize + ?Sized>(message: &str, payload: &T) {
                global::logger().$j(message, payload);
            }
        )*
    };
}

severity_surface! {
    DEFAULT => print, println, printf, printj,
        "Logs an entry with no assigned severity level.";
    DEBUG => debug, debugln, debugf, debugj,
        "Logs debug or trace information.";
    INFO => info, infoln, infof, infoj,
        "Logs routine information, such as ongoing status or performance.";
    NOTICE => notice, noticeln, noticef, noticej,
        "Logs normal but significant events, such as start up, shut down, or configuration.";
    WARNING => warning, warningln, warningf, warningj,
        "Logs events that might cause problems.";
    ERROR => error, errorln, errorf, errorj,
        "Logs events likely to cause problems.";
    CRITICAL => critical, criticalln, criticalf, criticalj,
        "Logs events that cause more severe problems or outages.";
    ALERT => alert, alertln, alertf, alertj,
        "Logs when a person must take an action immediately.";
    EMERGENCY => emergency, emergencyln, emergencyf, emergencyj,
        "Logs when one or more systems are unusable.";
}

macro_rules! escalation_surface {
    ($then:ident: $plain:ident, $ln:ident, $f:ident, $j:ident, $json:ident, $doc:literal) => {
        impl Logger {
            #[doc = $doc]
            pub fn $plain(&self, message: impl fmt::Display) -> ! {
                self.$then(message.to_string())
            }

            #[doc = $doc]
            pub fn $ln(&self, message: impl fmt::Display) -> ! {
                self.$then(format!("{}\n", message))
            }

            #[doc = $doc]
            pub fn $f(&self, args: fmt::Arguments<'_>) -> ! {
                self.$then(args.to_string())
            }

            #[doc = $doc]
            pub fn $j<T: Serialize + ?Sized>(&self, message: &str, payload: &T) -> ! {
                self.$json(message.into(), payload)
            }
        }

        #[doc = $doc]
        pub fn $plain(message: impl fmt::Display) -> ! {
            global::logger().$plain(message)
        }

        #[doc = $doc]
        pub fn $ln(message: impl fmt::Display) -> ! {
            global::logger().$ln(message)
        }

        #[doc = $doc]
        pub fn $f(args: fmt::Arguments<'_>) -> ! {
            global::logger().$f(args)
        }

        #[doc = $doc]
        pub fn $j<T: Serialize + ?Sized>(message: &str, payload: &T) -> ! {
            global::logger().$j(message, payload)
        }
    };
}

escalation_surface!(
    exit_with_message: fatal, fatalln, fatalf, fatalj, exit_with_json,
    "Logs at CRITICAL severity, then exits the process with status 1."
);

escalation_surface!(
    panic_message: panic, panicln, panicf, panicj, panic_json,
    "Logs at CRITICAL severity, then unwinds with a `CriticalFault` carrying the message.\n\n\
     The panic report shows `Box<dyn Any>`; downcast the payload to `CriticalFault` for the text."
);

/// Log through a [`Logger`] with `format!`-style arguments.
///
/// ```rust,ignore
/// cloudlog::logf!(Severity::INFO, "Hello {:?}!", "Google");
/// cloudlog::logf!(request_logger => Severity::WARNING, "retry {} of {}", n, max);
/// ```
#[macro_export]
macro_rules! logf {
    ($logger:expr => $severity:expr, $($arg:tt)+) => {
        $logger.log_fmt($severity, ::std::format_args!($($arg)+))
    };
    ($severity:expr, $($arg:tt)+) => {
        $crate::global::logger().log_fmt($severity, ::std::format_args!($($arg)+))
    };
}
