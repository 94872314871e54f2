//! Trace extraction from the `X-Cloud-Trace-Context` request header.
//!
//! Header format: `TRACE_ID/SPAN_ID;o=OPTIONS`. Tracing is best-effort
//! annotation, so anything malformed is dropped instead of failing the call.

use std::fmt;

use axum::http::{HeaderMap, Request};

/// Name of the inbound trace header.
pub const TRACE_HEADER: &str = "X-Cloud-Trace-Context";

/// Upper bound on the trace id segment.
const MAX_TRACE_ID_LEN: usize = 64;

/// A project-qualified trace identifier:
/// `projects/<project>/traces/<trace-id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(String);

impl TraceId {
    /// Qualify a raw trace id with the project it belongs to.
    pub fn new(project_id: &str, trace_id: &str) -> Self {
        TraceId(format!("projects/{}/traces/{}", project_id, trace_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can look up a request header by name.
pub trait HeaderSource {
    fn header(&self, name: &str) -> Option<&str>;
}

impl HeaderSource for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }
}

impl<B> HeaderSource for Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().header(name)
    }
}

/// Extract the trace id for a request, if tracing is enabled and the header
/// carries a usable one.
pub fn trace_from_headers(project_id: Option<&str>, headers: &impl HeaderSource) -> Option<TraceId> {
    let project_id = project_id.filter(|p| !p.is_empty())?;
    let header = headers.header(TRACE_HEADER)?;
    parse_trace_header(project_id, header)
}

/// Parse a raw header value against the given project.
pub fn parse_trace_header(project_id: &str, header: &str) -> Option<TraceId> {
    if project_id.is_empty() {
        return None;
    }

    let Some((candidate, rest)) = header.split_once('/') else {
        tracing::trace!(header, "Trace header has no span separator");
        return None;
    };

    if rest.contains(";o=0") {
        return None;
    }

    if candidate.is_empty() || candidate.len() > MAX_TRACE_ID_LEN {
        tracing::trace!(len = candidate.len(), "Trace id has unusable length");
        return None;
    }

    if !candidate
        .bytes()
        .all(|b| b.is_ascii_hexdigit() || b == b'x' || b == b'X')
    {
        tracing::trace!(header, "Trace id contains non-hex characters");
        return None;
    }

    if candidate.bytes().all(|b| b == b'0') {
        return None;
    }

    Some(TraceId::new(project_id, candidate))
}
