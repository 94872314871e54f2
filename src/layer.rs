//! `tracing` bridge.
//!
//! Renders `tracing` events as Cloud Logging entries so code instrumented
//! with `tracing::info!` and friends ends up in the same severity-tagged
//! stream as direct logger calls.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogConfig;
use crate::error::{LogError, LogResult};
use crate::logger::Logger;
use crate::severity::Severity;

/// Layer that writes each event through a [`Logger`].
pub struct CloudLoggingLayer {
    logger: Arc<Logger>,
}

impl CloudLoggingLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for CloudLoggingLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut fields = visitor.fields;
        fields
            .entry("target")
            .or_insert_with(|| Value::from(metadata.target()));

        self.logger.log_json(
            Severity::from(*metadata.level()),
            &visitor.message.unwrap_or_default(),
            &fields,
        );
    }
}

/// Collects the `message` field and everything else, in recording order.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, Value::String(format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form.
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.insert(field, Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }
}

/// Install a global `tracing` subscriber that writes Cloud Logging entries
/// to stdout/stderr.
///
/// The filter comes from `RUST_LOG`, falling back to the configured default.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> LogResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(CloudLoggingLayer::new(Arc::new(Logger::default())))
        .try_init()
        .map_err(|e| LogError::Subscriber(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::test_support::SharedBuffer;

    fn capture<F: FnOnce()>(f: F) -> (SharedBuffer, SharedBuffer) {
        let normal = SharedBuffer::default();
        let error = SharedBuffer::default();
        let logger = Arc::new(Logger::with_writers(normal.clone(), error.clone()));
        let subscriber = tracing_subscriber::registry().with(CloudLoggingLayer::new(logger));

        tracing::subscriber::with_default(subscriber, f);
        (normal, error)
    }

    #[test]
    fn test_event_becomes_entry() {
        let (normal, error) = capture(|| {
            tracing::info!(user = "bob", attempts = 3, ok = true, "hello {}", "world");
        });

        assert!(error.contents().is_empty());
        let line = normal.contents();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["message"], "hello world");
        assert_eq!(value["severity"], "INFO");
        assert_eq!(value["user"], "bob");
        assert_eq!(value["attempts"], 3);
        assert_eq!(value["ok"], true);
        assert_eq!(value["target"], module_path!());
        assert!(line.find("\"user\"").unwrap() < line.find("\"attempts\"").unwrap());
    }

    #[test]
    fn test_levels_map_to_severities_and_streams() {
        let (normal, error) = capture(|| {
            tracing::trace!("t");
            tracing::debug!("d");
            tracing::warn!("w");
            tracing::error!("e");
        });

        let severities = |buf: &SharedBuffer| -> Vec<String> {
            buf.lines()
                .iter()
                .map(|l| {
                    let v: Value = serde_json::from_str(l).unwrap();
                    v["severity"].as_str().unwrap().to_string()
                })
                .collect()
        };
        assert_eq!(severities(&normal), vec!["DEBUG", "DEBUG", "WARNING"]);
        assert_eq!(severities(&error), vec!["ERROR"]);
    }

    #[test]
    fn test_event_field_named_target_is_kept() {
        let (normal, _) = capture(|| {
            tracing::info!(target = "db-primary", "failover");
        });

        let value: Value = serde_json::from_str(&normal.contents()).unwrap();
        assert_eq!(value["target"], "db-primary");
        assert_eq!(value["message"], "failover");
    }

    #[test]
    fn test_debug_formatted_fields() {
        let (normal, _) = capture(|| {
            let path = std::path::PathBuf::from("/tmp/x");
            tracing::info!(path = ?path, "opened");
        });

        let value: Value = serde_json::from_str(&normal.contents()).unwrap();
        assert_eq!(value["path"], "\"/tmp/x\"");
        assert_eq!(value["message"], "opened");
    }
}
