//! Entry formatting.
//!
//! Plain entries serialize the reserved fields only. Structured entries
//! splice the reserved fields into the caller's already-serialized payload
//! instead of decoding and re-encoding it, so payload key order survives
//! untouched and large payloads are encoded exactly once.

use serde::Serialize;

use crate::severity::Severity;
use crate::trace::TraceId;

/// Key Cloud Logging reads the trace id from.
pub const TRACE_KEY: &str = "logging.googleapis.com/trace";

/// Diagnostic written in place of a payload that failed to serialize.
pub const MARSHAL_FAILURE: &str = "cannot marshal the argument as jsonPayload";

/// Reserved top-level fields of every entry, in emission order.
#[derive(Debug, Serialize)]
struct Reserved<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<&'static str>,
    #[serde(rename = "logging.googleapis.com/trace", skip_serializing_if = "Option::is_none")]
    trace: Option<&'a str>,
}

/// Entry written when the caller's payload cannot be serialized.
#[derive(Debug, Serialize)]
struct MarshalFailure<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<&'static str>,
    #[serde(rename = "logLibMsg")]
    log_lib_msg: &'static str,
}

fn encode<T: Serialize>(value: &T, out: &mut Vec<u8>) {
    // Only string and option fields; writing into a Vec cannot fail.
    let _ = serde_json::to_writer(&mut *out, value);
}

/// Format a message-only entry as one newline-terminated JSON line.
pub fn format_plain(severity: Severity, trace: Option<&TraceId>, message: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 48);
    encode(
        &Reserved {
            message,
            severity: severity.name(),
            trace: trace.map(TraceId::as_str),
        },
        &mut out,
    );
    out.push(b'\n');
    out
}

/// Format an entry whose fields are merged with a caller-supplied payload.
///
/// Object payloads get the reserved fields spliced in ahead of their own
/// keys. Anything else (null, scalars, arrays) is nested under `"value"`.
/// A payload whose serializer returns an error is replaced by a diagnostic
/// entry; a serializer that panics is not intercepted.
pub fn format_structured<T>(
    severity: Severity,
    trace: Option<&TraceId>,
    message: &str,
    payload: &T,
) -> Vec<u8>
where
    T: Serialize + ?Sized,
{
    let payload = match serde_json::to_vec(payload) {
        Ok(payload) => payload,
        Err(_) => return format_marshal_failure(severity, message),
    };

    let mut out = Vec::with_capacity(payload.len() + message.len() + 64);
    encode(
        &Reserved {
            message,
            severity: severity.name(),
            trace: trace.map(TraceId::as_str),
        },
        &mut out,
    );
    let reserved_is_empty = out.len() == 2;

    match payload.split_first() {
        Some((&b'{', body)) => {
            if reserved_is_empty {
                out.clear();
                out.push(b'{');
            } else {
                out.pop();
                if !is_empty_object_body(body) {
                    out.push(b',');
                }
            }
            out.extend_from_slice(body);
        }
        _ => {
            out.pop();
            if !reserved_is_empty {
                out.push(b',');
            }
            out.extend_from_slice(b"\"value\":");
            out.extend_from_slice(&payload);
            out.push(b'}');
        }
    }

    out.push(b'\n');
    out
}

fn format_marshal_failure(severity: Severity, message: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 96);
    encode(
        &MarshalFailure {
            message,
            severity: severity.name(),
            log_lib_msg: MARSHAL_FAILURE,
        },
        &mut out,
    );
    out.push(b'\n');
    out
}

/// `body` is everything after the opening brace.
fn is_empty_object_body(body: &[u8]) -> bool {
    body.iter()
        .find(|b| !b.is_ascii_whitespace())
        .map_or(true, |&b| b == b'}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;
    use std::collections::HashMap;

    fn line(bytes: Vec<u8>) -> String {
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
        text.trim_end().to_string()
    }

    fn trace() -> TraceId {
        TraceId::new("my-project", "0af7651916cd43dd8448eb211c80319c")
    }

    #[derive(Serialize)]
    struct Job {
        seq: u32,
        component: &'static str,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    struct Exploding;

    impl Serialize for Exploding {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            panic!("serializer blew up");
        }
    }

    #[test]
    fn test_plain_default_severity_is_omitted() {
        assert_eq!(
            line(format_plain(Severity::DEFAULT, None, "Test")),
            r#"{"message":"Test"}"#
        );
    }

    #[test]
    fn test_plain_field_order_and_omission() {
        assert_eq!(
            line(format_plain(Severity::INFO, Some(&trace()), "Hello \"Google\"!")),
            r#"{"message":"Hello \"Google\"!","severity":"INFO","logging.googleapis.com/trace":"projects/my-project/traces/0af7651916cd43dd8448eb211c80319c"}"#
        );
        assert_eq!(line(format_plain(Severity::ERROR, None, "")), r#"{"severity":"ERROR"}"#);
        assert_eq!(line(format_plain(Severity::from_raw(123), None, "x")), r#"{"message":"x"}"#);
    }

    #[test]
    fn test_plain_every_severity_name() {
        for sev in Severity::ALL {
            let value: Value = serde_json::from_str(&line(format_plain(sev, None, "m"))).unwrap();
            assert_eq!(value["severity"], sev.name().unwrap());
            assert_eq!(value["message"], "m");
            assert!(value.get(TRACE_KEY).is_none());
        }
    }

    #[test]
    fn test_no_html_escaping() {
        let text = line(format_plain(Severity::NOTICE, None, "a < b && c > d"));
        assert!(text.contains("a < b && c > d"));
    }

    #[test]
    fn test_structured_object_splice() {
        let job = Job {
            seq: 42,
            component: "app",
        };
        assert_eq!(
            line(format_structured(Severity::NOTICE, None, "warning", &job)),
            r#"{"message":"warning","severity":"NOTICE","seq":42,"component":"app"}"#
        );
    }

    #[test]
    fn test_structured_with_trace() {
        let text = line(format_structured(
            Severity::ERROR,
            Some(&trace()),
            "failed",
            &serde_json::json!({"attempt": 3}),
        ));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["attempt"], 3);
        assert_eq!(value[TRACE_KEY], trace().as_str());
        assert!(text.find(TRACE_KEY).unwrap() < text.find("attempt").unwrap());
    }

    #[test]
    fn test_structured_empty_object() {
        let empty: HashMap<String, i32> = HashMap::new();
        assert_eq!(
            line(format_structured(Severity::INFO, None, "m", &empty)),
            r#"{"message":"m","severity":"INFO"}"#
        );
        assert_eq!(line(format_structured(Severity::DEFAULT, None, "", &empty)), "{}");
    }

    #[test]
    fn test_structured_without_reserved_fields_passes_payload_through() {
        let job = Job {
            seq: 1,
            component: "db",
        };
        assert_eq!(
            line(format_structured(Severity::DEFAULT, None, "", &job)),
            r#"{"seq":1,"component":"db"}"#
        );
    }

    #[test]
    fn test_structured_non_object_payloads_are_wrapped() {
        let none: Option<&Job> = None;
        assert_eq!(
            line(format_structured(Severity::INFO, None, "m", &none)),
            r#"{"message":"m","severity":"INFO","value":null}"#
        );
        assert_eq!(
            line(format_structured(Severity::INFO, None, "m", &())),
            r#"{"message":"m","severity":"INFO","value":null}"#
        );
        assert_eq!(
            line(format_structured(Severity::DEFAULT, None, "m", "text")),
            r#"{"message":"m","value":"text"}"#
        );
        assert_eq!(
            line(format_structured(Severity::DEFAULT, None, "", &7)),
            r#"{"value":7}"#
        );
        let value: Value =
            serde_json::from_str(&line(format_structured(Severity::ALERT, None, "m", &[1, 2, 3])))
                .unwrap();
        assert_eq!(value["value"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_duplicate_reserved_keys_are_tolerated() {
        let text = line(format_structured(
            Severity::INFO,
            None,
            "outer",
            &serde_json::json!({"message": "inner"}),
        ));
        assert_eq!(text.matches("\"message\"").count(), 2);
        assert!(serde_json::from_str::<Value>(&text).is_ok());
    }

    #[test]
    fn test_serializer_error_yields_diagnostic_entry() {
        assert_eq!(
            line(format_structured(Severity::WARNING, Some(&trace()), "oops", &Unserializable)),
            r#"{"message":"oops","severity":"WARNING","logLibMsg":"cannot marshal the argument as jsonPayload"}"#
        );

        let mut tuple_keys = HashMap::new();
        tuple_keys.insert((1, 2), "v");
        let value: Value =
            serde_json::from_str(&line(format_structured(Severity::INFO, None, "m", &tuple_keys)))
                .unwrap();
        assert_eq!(value["logLibMsg"], MARSHAL_FAILURE);
    }

    #[test]
    #[should_panic(expected = "serializer blew up")]
    fn test_serializer_panic_propagates() {
        format_structured(Severity::INFO, None, "m", &Exploding);
    }

    proptest! {
        #[test]
        fn prop_object_splice_is_valid_json_and_keeps_order(
            keys in proptest::collection::vec("[a-z]{1,8}", 0..8),
            message in ".*",
        ) {
            let mut payload = serde_json::Map::new();
            for (i, key) in keys.iter().enumerate() {
                payload.insert(format!("k_{key}"), Value::from(i));
            }

            let text = line(format_structured(Severity::CRITICAL, Some(&trace()), &message, &payload));
            let value: Value = serde_json::from_str(&text).unwrap();
            let object = value.as_object().unwrap();

            prop_assert_eq!(object["severity"].as_str(), Some("CRITICAL"));
            prop_assert_eq!(object.get("message").and_then(Value::as_str).unwrap_or(""), message.as_str());
            prop_assert_eq!(object.len(), payload.len() + 2 + usize::from(!message.is_empty()));

            let payload_keys: Vec<_> = payload.keys().cloned().collect();
            let emitted: Vec<_> = object.keys().filter(|k| k.starts_with("k_")).cloned().collect();
            prop_assert_eq!(emitted, payload_keys);
            let leads_with_message = text.starts_with(r#"{"message""#);
            prop_assert!(leads_with_message || message.is_empty(), "message must lead the entry");
        }
    }
}
